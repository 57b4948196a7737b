//! Audit profiles -- which checks to run, grouped by category.
//!
//! Profiles are TOML documents:
//!
//! ```toml
//! [[Audit]]
//! Name = "Host Configuration"
//! Checklist = ["kernel_version", "separate_partition"]
//! ```
//!
//! Check names must exactly match registry keys; the runner treats an
//! unknown name as fatal.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, Result};

/// One category of checks in a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditCategory {
    /// Category display name (e.g. "Host Configuration").
    #[serde(rename = "Name")]
    pub name: String,
    /// Registry keys to run, in order.
    #[serde(rename = "Checklist")]
    pub checklist: Vec<String>,
}

/// A full audit profile: an ordered list of categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Categories in run order.
    #[serde(rename = "Audit", default)]
    pub audit: Vec<AuditCategory>,
}

impl Profile {
    /// Parse a profile from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CoreError::Profile(e.to_string()))
    }

    /// Load a profile from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Profile(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Total number of check names across all categories.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.audit.iter().map(|c| c.checklist.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[[Audit]]
Name = "Host Configuration"
Checklist = [
    "separate_partition",
    "kernel_version",
]

[[Audit]]
Name = "Container Runtime"
Checklist = ["apparmor_profile"]
"#;

    #[test]
    fn test_parse_profile() {
        let profile = Profile::from_toml(SAMPLE).unwrap();
        assert_eq!(profile.audit.len(), 2);
        assert_eq!(profile.audit[0].name, "Host Configuration");
        assert_eq!(profile.audit[0].checklist[0], "separate_partition");
        assert_eq!(profile.audit[1].checklist, vec!["apparmor_profile"]);
        assert_eq!(profile.check_count(), 3);
    }

    #[test]
    fn test_load_from_file() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "{SAMPLE}").unwrap();

        let profile = Profile::from_file(tmpfile.path()).unwrap();
        assert_eq!(profile.audit[1].name, "Container Runtime");
    }

    #[test]
    fn test_missing_file_is_profile_error() {
        let err = Profile::from_file(Path::new("/nonexistent/profile.toml")).unwrap_err();
        assert!(matches!(err, CoreError::Profile(_)));
    }

    #[test]
    fn test_invalid_toml_is_profile_error() {
        let err = Profile::from_toml("[[Audit]\nName =").unwrap_err();
        assert!(matches!(err, CoreError::Profile(_)));
    }
}

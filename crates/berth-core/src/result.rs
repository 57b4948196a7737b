//! Check results -- the outcome of one check invocation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal status of a check.
///
/// A check never produces a hard failure: violated conditions are
/// advisory and reported as `Warn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    /// Condition verified.
    Pass,
    /// Condition violated (advisory).
    Warn,
    /// Observational output with no pass/fail semantics.
    Info,
    /// Preconditions unmet; the check did not run.
    Skip,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Skip => "SKIP",
        };
        f.write_str(s)
    }
}

/// Outcome of a single check invocation.
///
/// Built through exactly one of the four constructors and immutable
/// afterwards: a result carries exactly one terminal status for its
/// whole lifetime. Field names are stable for JSON/YAML/CSV output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CheckResult {
    /// Human-readable check title (e.g. a benchmark section heading).
    pub name: String,
    /// Terminal status.
    pub status: CheckStatus,
    /// Optional explanation: reason for a skip/warn, or info payload.
    pub output: String,
}

impl CheckResult {
    /// The check verified its condition.
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Pass,
            output: String::new(),
        }
    }

    /// The check's condition is violated. Status is `Warn` -- violations
    /// are advisory, never fatal.
    pub fn fail(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warn,
            output: reason.into(),
        }
    }

    /// Observational result with no pass/fail semantics.
    pub fn info(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Info,
            output: message.into(),
        }
    }

    /// The check could not run (missing file, no containers, ...).
    /// Not a failure.
    pub fn skip(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Skip,
            output: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_maps_to_warn() {
        let res = CheckResult::fail("2.5 Do not use the aufs storage driver", "aufs in use");
        assert_eq!(res.status, CheckStatus::Warn);
        assert_eq!(res.output, "aufs in use");
    }

    #[test]
    fn test_pass_has_empty_output() {
        let res = CheckResult::pass("1.2 Use the updated Linux Kernel");
        assert_eq!(res.status, CheckStatus::Pass);
        assert!(res.output.is_empty());
    }

    #[test]
    fn test_serialized_field_names_are_stable() {
        let res = CheckResult::skip("5.1 Verify AppArmor Profile", "No running containers");
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["Name"], "5.1 Verify AppArmor Profile");
        assert_eq!(json["Status"], "SKIP");
        assert_eq!(json["Output"], "No running containers");
    }

    #[test]
    fn test_status_round_trip() {
        for status in ["PASS", "WARN", "INFO", "SKIP"] {
            let parsed: CheckStatus =
                serde_json::from_str(&format!("\"{status}\"")).unwrap();
            assert_eq!(parsed.to_string(), status);
        }
    }
}

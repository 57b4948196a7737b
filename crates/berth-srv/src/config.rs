//! Aggregation server configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{Result, SrvError};

/// Configuration for a berth aggregation server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// TCP listen address (default: 0.0.0.0:8000).
    pub listen: SocketAddr,

    /// Directory with the viewer UI assets, served at `/`.
    pub asset_dir: Option<PathBuf>,

    /// Username accepted at `GET /token`.
    #[serde(default = "default_username")]
    pub username: String,

    /// Reference password, inline. Prefer `password_file`.
    pub password: Option<String>,

    /// File holding the reference password (trailing whitespace ignored).
    pub password_file: Option<PathBuf>,

    /// Issued-token lifetime in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8000".parse().expect("valid default addr"),
            asset_dir: None,
            username: default_username(),
            password: None,
            password_file: None,
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

impl ServerConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| SrvError::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the reference password from the file or the inline value.
    pub fn reference_password(&self) -> Result<String> {
        if let Some(file) = &self.password_file {
            let content = std::fs::read_to_string(file).map_err(|e| {
                SrvError::Config(format!("cannot read password file {}: {e}", file.display()))
            })?;
            return Ok(content.trim_end().to_string());
        }
        self.password
            .clone()
            .ok_or_else(|| SrvError::Config("no password or password_file configured".into()))
    }
}

// Default value functions for serde.
fn default_username() -> String {
    String::from("defaultUser")
}

const fn default_token_ttl_hours() -> u64 {
    24
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.listen.port(), 8000);
        assert_eq!(config.username, "defaultUser");
        assert_eq!(config.token_ttl_hours, 24);
        assert!(config.asset_dir.is_none());
    }

    #[test]
    fn test_load_from_toml() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmpfile,
            r#"
listen = "127.0.0.1:9000"
username = "auditor"
password = "secret"
token_ttl_hours = 1
"#
        )
        .unwrap();

        let config = ServerConfig::load(tmpfile.path()).unwrap();
        assert_eq!(config.listen.port(), 9000);
        assert_eq!(config.username, "auditor");
        assert_eq!(config.token_ttl_hours, 1);
        assert_eq!(config.reference_password().unwrap(), "secret");
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = ServerConfig::load(Path::new("/nonexistent/berth.toml")).unwrap();
        assert_eq!(config.listen.port(), 8000);
    }

    #[test]
    fn test_password_file_trims_trailing_newline() {
        let mut pwfile = tempfile::NamedTempFile::new().unwrap();
        writeln!(pwfile, "hunter2").unwrap();

        let config = ServerConfig {
            password_file: Some(pwfile.path().to_path_buf()),
            ..ServerConfig::default()
        };
        assert_eq!(config.reference_password().unwrap(), "hunter2");
    }

    #[test]
    fn test_missing_password_is_config_error() {
        let err = ServerConfig::default().reference_password().unwrap_err();
        assert!(matches!(err, SrvError::Config(_)));
    }
}

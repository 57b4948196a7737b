//! Profile loading from a local path or a remote URL.
//!
//! Remote profiles may be pinned to an expected SHA-256; a digest
//! mismatch rejects the document before it is parsed.

use anyhow::{bail, Context, Result};
use ring::digest;
use std::path::Path;

use berth_core::Profile;

/// Load a profile from a file path or http(s) URL.
pub async fn load(source: &str, expected_sha256: Option<&str>) -> Result<Profile> {
    if source.starts_with("http://") || source.starts_with("https://") {
        fetch(source, expected_sha256).await
    } else {
        Profile::from_file(Path::new(source))
            .with_context(|| format!("invalid profile path: {source}"))
    }
}

/// Fetch a profile over HTTP, verifying its digest when pinned.
async fn fetch(url: &str, expected_sha256: Option<&str>) -> Result<Profile> {
    let body = reqwest::get(url)
        .await
        .and_then(reqwest::Response::error_for_status)
        .with_context(|| format!("unable to fetch profile from {url}"))?
        .text()
        .await
        .context("unable to read profile body")?;

    if let Some(expected) = expected_sha256 {
        let actual = hex::encode(digest::digest(&digest::SHA256, body.as_bytes()));
        if !actual.eq_ignore_ascii_case(expected) {
            bail!("profile digest mismatch: expected {expected}, got {actual}");
        }
    }

    Ok(Profile::from_toml(&body)?)
}

/// Stable identifier for this node: machine id, then hostname.
pub fn node_id() -> String {
    if let Ok(id) = std::fs::read_to_string("/etc/machine-id") {
        let trimmed = id.trim().to_string();
        if !trimmed.is_empty() {
            return trimmed;
        }
    }

    hostname::get().map_or_else(
        |_| "unknown".to_string(),
        |h| h.to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_from_file() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmpfile,
            "[[Audit]]\nName = \"Host\"\nChecklist = [\"kernel_version\"]\n"
        )
        .unwrap();

        let profile = load(tmpfile.path().to_str().unwrap(), None).await.unwrap();
        assert_eq!(profile.audit[0].checklist, vec!["kernel_version"]);
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let err = load("/nonexistent/profile.toml", None).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/profile.toml"));
    }

    #[test]
    fn test_node_id_is_nonempty() {
        assert!(!node_id().is_empty());
    }
}

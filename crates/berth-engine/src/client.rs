//! Engine CLI client: structured queries against the `docker` binary.
//!
//! Commands are built programmatically (no shell interpolation) and run
//! under a per-command timeout so an unresponsive daemon cannot hang an
//! audit indefinitely.

use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::types::{
    ContainerDetail, ContainerSummary, DaemonInfo, ImageSummary, NetworkInfo,
};

/// Default timeout for one engine CLI invocation.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the container engine CLI.
#[derive(Debug, Clone)]
pub struct EngineClient {
    binary: PathBuf,
    timeout: Duration,
}

impl EngineClient {
    /// Locate the `docker` binary on PATH and build a client.
    pub fn new() -> Result<Self> {
        let binary = which::which("docker")
            .map_err(|e| EngineError::BinaryNotFound(e.to_string()))?;
        Ok(Self {
            binary,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Build a client for an explicit binary path (test seam / podman).
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-command timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Daemon/host information.
    pub async fn info(&self) -> Result<DaemonInfo> {
        let out = self.run(&["info", "--format", "{{json .}}"]).await?;
        serde_json::from_str(&out).map_err(|e| EngineError::Parse(e.to_string()))
    }

    /// List containers; `all` includes stopped ones.
    pub async fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>> {
        let mut args = vec!["container", "ls", "--no-trunc", "--format", "{{json .}}"];
        if all {
            args.push("--all");
        }
        let out = self.run(&args).await?;
        parse_json_lines(&out)
    }

    /// Inspect a set of containers in one call.
    pub async fn inspect_containers(&self, ids: &[String]) -> Result<Vec<ContainerDetail>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut args: Vec<&str> = vec!["container", "inspect"];
        args.extend(ids.iter().map(String::as_str));
        let out = self.run(&args).await?;
        serde_json::from_str(&out).map_err(|e| EngineError::Parse(e.to_string()))
    }

    /// List images; `all` includes intermediate layers.
    pub async fn list_images(&self, all: bool) -> Result<Vec<ImageSummary>> {
        let mut args = vec!["image", "ls", "--no-trunc", "--format", "{{json .}}"];
        if all {
            args.push("--all");
        }
        let out = self.run(&args).await?;
        parse_json_lines(&out)
    }

    /// Inspect every network known to the engine.
    pub async fn list_networks(&self) -> Result<Vec<NetworkInfo>> {
        let out = self.run(&["network", "ls", "--format", "{{.Name}}"]).await?;
        let names: Vec<&str> = out.lines().filter(|l| !l.is_empty()).collect();
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let mut args = vec!["network", "inspect"];
        args.extend(&names);
        let out = self.run(&args).await?;
        serde_json::from_str(&out).map_err(|e| EngineError::Parse(e.to_string()))
    }

    /// Process list of a running container (`docker top`), one row per
    /// process, whitespace-split. The header row is dropped.
    pub async fn container_procs(&self, id: &str) -> Result<Vec<Vec<String>>> {
        let out = self.run(&["top", id]).await?;
        Ok(out
            .lines()
            .skip(1)
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.split_whitespace().map(str::to_string).collect())
            .collect())
    }

    /// Identifiers of all nodes in the swarm. Fails when the host is not
    /// a swarm manager.
    pub async fn list_swarm_nodes(&self) -> Result<Vec<String>> {
        let out = self.run(&["node", "ls", "--format", "{{.ID}}"]).await?;
        Ok(out
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Run one engine CLI command and return trimmed stdout.
    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!(binary = %self.binary.display(), ?args, "engine command");

        let child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| EngineError::Timeout(args.join(" ")))??;

        if !output.status.success() {
            return Err(EngineError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Parse `--format '{{json .}}'` output: one JSON object per line.
fn parse_json_lines<T: DeserializeOwned>(out: &str) -> Result<Vec<T>> {
    out.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).map_err(|e| EngineError::Parse(e.to_string())))
        .collect()
}

/// Command line of the engine daemon process, read from `/proc`.
///
/// Returns an empty vector when no matching process is visible (the
/// daemon may run remotely or under a different name).
pub fn daemon_cmdline(procname: &str) -> Result<Vec<String>> {
    use procfs::prelude::*;

    let all = procfs::process::all_processes()
        .map_err(|e| EngineError::Procfs(e.to_string()))?;

    for entry in all {
        let Ok(proc) = entry else { continue };
        let Ok(stat) = proc.stat() else { continue };
        if stat.comm == procname {
            return proc
                .cmdline()
                .map_err(|e| EngineError::Procfs(e.to_string()));
        }
    }
    Ok(Vec::new())
}

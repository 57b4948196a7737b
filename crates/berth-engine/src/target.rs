//! The audit target: a point-in-time snapshot of the engine host.

use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::client::{daemon_cmdline, EngineClient};
use crate::error::Result;
use crate::types::{ContainerDetail, ContainerSummary, DaemonInfo, ImageSummary, NetworkInfo};

/// Name of the engine daemon process in `/proc`.
const DAEMON_PROCNAME: &str = "dockerd";

/// A running container with its inspected detail.
#[derive(Debug, Clone, Default)]
pub struct Container {
    /// Full container id.
    pub id: String,
    /// Inspect output.
    pub detail: ContainerDetail,
}

/// The running containers at snapshot time.
#[derive(Debug, Clone, Default)]
pub struct ContainerList(pub Vec<Container>);

impl ContainerList {
    /// Whether any container is running. Container checks must skip
    /// when this is false.
    #[must_use]
    pub fn running(&self) -> bool {
        !self.0.is_empty()
    }

    /// Iterate the containers.
    pub fn iter(&self) -> std::slice::Iter<'_, Container> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ContainerList {
    type Item = &'a Container;
    type IntoIter = std::slice::Iter<'a, Container>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Point-in-time view of the audited host.
///
/// All engine state is prefetched here once; checks are pure functions
/// over this snapshot and never talk to the engine themselves.
#[derive(Debug, Clone, Default)]
pub struct Target {
    /// Daemon/host information.
    pub info: DaemonInfo,
    /// Running containers, inspected.
    pub containers: ContainerList,
    /// Summaries of all containers, including stopped ones.
    pub all_containers: Vec<ContainerSummary>,
    /// Image summaries.
    pub images: Vec<ImageSummary>,
    /// Networks with driver options.
    pub networks: Vec<NetworkInfo>,
    /// Per-container process tables (container id → `docker top` rows).
    pub container_procs: HashMap<String, Vec<Vec<String>>>,
    /// Command line of the engine daemon process (empty when invisible).
    pub daemon_cmdline: Vec<String>,
    /// Root for host-file lookups. `/` in production; tests point this
    /// at a fixture tree.
    pub base_dir: PathBuf,
}

impl Target {
    /// Collect a full snapshot from the engine.
    ///
    /// Daemon info and the running-container list are mandatory; images,
    /// networks and process tables degrade to empty collections with a
    /// warning so that checks depending on them skip rather than the
    /// whole audit failing.
    pub async fn collect(engine: &EngineClient) -> Result<Self> {
        let info = engine.info().await?;

        let running = engine.list_containers(false).await?;
        let ids: Vec<String> = running.iter().map(|c| c.id.clone()).collect();
        let details = engine.inspect_containers(&ids).await?;
        let containers = ContainerList(
            details
                .into_iter()
                .map(|detail| Container {
                    id: detail.id.clone(),
                    detail,
                })
                .collect(),
        );

        let all_containers = engine.list_containers(true).await.unwrap_or_else(|e| {
            warn!(error = %e, "unable to list all containers");
            Vec::new()
        });
        let images = engine.list_images(false).await.unwrap_or_else(|e| {
            warn!(error = %e, "unable to list images");
            Vec::new()
        });
        let networks = engine.list_networks().await.unwrap_or_else(|e| {
            warn!(error = %e, "unable to inspect networks");
            Vec::new()
        });

        let mut container_procs = HashMap::new();
        for container in &containers {
            match engine.container_procs(&container.id).await {
                Ok(procs) => {
                    container_procs.insert(container.id.clone(), procs);
                }
                Err(e) => {
                    debug!(container = %container.id, error = %e, "unable to read process table");
                }
            }
        }

        let cmdline = daemon_cmdline(DAEMON_PROCNAME).unwrap_or_else(|e| {
            warn!(error = %e, "unable to read daemon command line");
            Vec::new()
        });

        debug!(
            containers = containers.0.len(),
            images = images.len(),
            networks = networks.len(),
            "target snapshot collected"
        );

        Ok(Self {
            info,
            containers,
            all_containers,
            images,
            networks,
            container_procs,
            daemon_cmdline: cmdline,
            base_dir: PathBuf::from("/"),
        })
    }

    /// Resolve a host path against the snapshot's base directory.
    #[must_use]
    pub fn host_path(&self, path: &str) -> PathBuf {
        self.base_dir.join(path.trim_start_matches('/'))
    }
}

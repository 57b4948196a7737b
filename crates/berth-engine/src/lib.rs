//! # berth-engine
//!
//! Container-engine access for berth audits.
//!
//! [`EngineClient`] shells out to the `docker` CLI with structured
//! (`{{json .}}`) output and per-command timeouts; no long-lived daemon
//! connection is held. [`Target`] is the point-in-time snapshot checks
//! run against: daemon info, inspected running containers, container and
//! image summaries, networks, per-container process lists, and the daemon
//! process command line.
//!
//! The snapshot is fetched once at [`Target::collect`] and never refreshed
//! during a run, so every check observes the same view of the host even
//! if engine state changes mid-audit.

pub mod client;
pub mod error;
pub mod target;
pub mod types;

pub use client::EngineClient;
pub use error::{EngineError, Result};
pub use target::{Container, ContainerList, Target};
pub use types::{
    ContainerDetail, ContainerSummary, DaemonInfo, HostConfig, ImageSummary, Mount, NetworkInfo,
    PortBinding, RestartPolicy,
};

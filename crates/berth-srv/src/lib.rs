//! # berth-srv
//!
//! Result aggregation for fleet audits: many audited nodes POST their
//! serialized result sequences to one collector; a viewer reads them
//! back per node. All state is in memory and lost on restart.
//!
//! # Architecture
//!
//! - [`store::ReportStore`] -- node id → result blob, plus the append-only
//!   received log backing "has node X reported" queries. One mutex guards
//!   both: a report submission touches both structures and readers must
//!   never observe one without the other.
//! - [`auth`] -- HMAC-SHA256 signed bearer tokens, issued against HTTP
//!   Basic credentials at `/token`, validated fail-closed by middleware
//!   on the results endpoints; a minimal role-based permission check.
//! - [`api`] -- the axum surface: `POST /results`, `GET /result`,
//!   `GET /getNodeList`, `POST /checkNode`, static viewer assets.
//! - [`client::AggregatorClient`] -- the node/viewer side of the same
//!   wire contract.
//!
//! Malformed request bodies are per-request errors (HTTP 400); one bad
//! client never takes the collector down for other nodes.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod store;

pub use client::AggregatorClient;
pub use config::ServerConfig;
pub use error::{Result, SrvError};
pub use store::{NodeReport, ReportStore};

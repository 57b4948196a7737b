//! # berth-core
//!
//! Shared leaf types for the berth container-host security auditor:
//! check results, audit profiles, and report writers.
//!
//! Everything here is consumed by the check catalog (`berth-checks`),
//! the aggregation server (`berth-srv`), and the CLI. The types are
//! deliberately small and serialization-stable: `CheckResult` field names
//! (`Name`/`Status`/`Output`) and profile field names (`Audit`/`Name`/
//! `Checklist`) are wire/profile contracts and must not change.

pub mod error;
pub mod profile;
pub mod report;
pub mod result;

pub use error::{CoreError, Result};
pub use profile::{AuditCategory, Profile};
pub use report::Report;
pub use result::{CheckResult, CheckStatus};

//! The audit runner: cross-references a profile's checklist against the
//! registry and executes checks in order.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use berth_core::{CheckResult, Profile};
use berth_engine::Target;

use crate::error::{CheckError, Result};
use crate::registry::Registry;

/// Default bound on a single check's execution time.
const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(60);

/// Executes a checklist against a registry.
///
/// Checks run one at a time, in checklist order; results come back in
/// exactly that order. A checklist entry that does not resolve in the
/// registry aborts the whole run before any report is produced.
#[derive(Debug, Clone)]
pub struct Runner {
    check_timeout: Duration,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Runner with the default per-check timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            check_timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }

    /// Override the per-check timeout.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self {
            check_timeout: timeout,
        }
    }

    /// Run every check the profile names, in order.
    ///
    /// # Errors
    ///
    /// `CheckError::UnknownCheck` when a checklist entry is absent from
    /// the registry; the error names the offending entry and no results
    /// are returned. `CheckError::Internal` when a check panics.
    pub async fn run(
        &self,
        profile: &Profile,
        registry: &Registry,
        target: Arc<Target>,
    ) -> Result<Vec<CheckResult>> {
        let mut results = Vec::with_capacity(profile.check_count());

        for category in &profile.audit {
            debug!(category = %category.name, checks = category.checklist.len(), "running category");

            for check_name in &category.checklist {
                let Some(check) = registry.get(check_name) else {
                    return Err(CheckError::UnknownCheck {
                        name: check_name.clone(),
                    });
                };

                let target = Arc::clone(&target);
                let worker = tokio::task::spawn_blocking(move || check(&target));

                let result = match tokio::time::timeout(self.check_timeout, worker).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(join_err)) => {
                        return Err(CheckError::Internal {
                            name: check_name.clone(),
                            message: join_err.to_string(),
                        });
                    }
                    // The worker thread is abandoned; the run moves on.
                    Err(_) => CheckResult::skip(
                        check_name.clone(),
                        format!("Check timed out after {:?}", self.check_timeout),
                    ),
                };

                debug!(check = %check_name, status = %result.status, "check finished");
                results.push(result);
            }
        }

        info!(results = results.len(), "audit run complete");
        Ok(results)
    }
}

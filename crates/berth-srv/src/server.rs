//! Server runner: binds TCP and serves the aggregation API.
//!
//! TLS termination is left to a fronting proxy; the listener here is
//! plain TCP.

use tokio::net::TcpListener;
use tracing::info;

use crate::api::{self, ApiState};
use crate::auth::generate_signing_key;
use crate::config::ServerConfig;
use crate::error::{Result, SrvError};

/// Start the aggregation server with the given configuration and fleet
/// snapshot, running until shutdown.
///
/// The signing key is drawn here, once, and lives exactly as long as the
/// process; restarting the server invalidates all outstanding tokens.
pub async fn run(config: &ServerConfig, nodes: Vec<String>) -> Result<()> {
    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|e| SrvError::Server(format!("TCP bind {}: {e}", config.listen)))?;
    run_with_listener(listener, config, nodes).await
}

/// Serve on an already-bound listener (test seam for ephemeral ports).
pub async fn run_with_listener(
    listener: TcpListener,
    config: &ServerConfig,
    nodes: Vec<String>,
) -> Result<()> {
    let signing_key = generate_signing_key()?;
    let state = ApiState::new(config, nodes, &signing_key)?;
    let router = api::router(state, config.asset_dir.as_deref());

    let addr = listener
        .local_addr()
        .map_err(|e| SrvError::Server(e.to_string()))?;
    info!(addr = %addr, "berth aggregation server running");

    axum::serve(listener, router)
        .await
        .map_err(|e| SrvError::Server(e.to_string()))?;

    Ok(())
}

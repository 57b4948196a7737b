//! `berth serve`: run the fleet aggregation server.

use anyhow::{Context, Result};
use tracing::warn;

use berth_engine::EngineClient;
use berth_srv::{server, ServerConfig};

use crate::args::ServeArgs;

/// Execute the serve command.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = ServerConfig::load(&args.config)
        .with_context(|| format!("invalid config {}", args.config.display()))?;

    // Static fleet snapshot, taken once; the list never refreshes while
    // the server runs.
    let nodes = match swarm_nodes().await {
        Ok(nodes) => nodes,
        Err(e) => {
            warn!(error = %e, "unable to list swarm nodes; node list will be empty");
            Vec::new()
        }
    };

    server::run(&config, nodes)
        .await
        .context("aggregation server terminated")?;
    Ok(())
}

async fn swarm_nodes() -> Result<Vec<String>> {
    let engine = EngineClient::new()?;
    Ok(engine.list_swarm_nodes().await?)
}

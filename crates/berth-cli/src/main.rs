//! berth - container-host security auditor.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    berth_cli::run().await
}

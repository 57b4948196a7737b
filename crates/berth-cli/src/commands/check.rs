//! `berth check`: audit this node and optionally push the results.

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use berth_checks::{Registry, Runner};
use berth_core::report::{console_print, Report};
use berth_engine::{EngineClient, Target};
use berth_srv::AggregatorClient;

use crate::args::{CheckArgs, OutputFormat};
use crate::profile_source;

/// Execute the check command.
pub async fn execute(args: CheckArgs) -> Result<()> {
    let profile = profile_source::load(&args.profile, args.profile_sha256.as_deref()).await?;

    let engine = EngineClient::new().context("unable to reach the container engine")?;
    let target = Target::collect(&engine)
        .await
        .context("unable to snapshot the engine host")?;

    let registry = Registry::builtin();
    let runner = Runner::with_timeout(Duration::from_secs(args.check_timeout));
    let results = runner
        .run(&profile, &registry, Arc::new(target))
        .await
        .context("audit run aborted")?;

    info!(results = results.len(), "audit finished");

    let mut report = Report::new(&args.output_file);
    report.results = results;

    match args.output {
        OutputFormat::Console => {
            for res in &report.results {
                console_print(res);
            }
        }
        OutputFormat::Json => {
            report.write_json()?;
            println!(
                "{} {}",
                "Report written:".green(),
                report.filename.display()
            );
        }
        OutputFormat::Yaml => {
            report.write_yaml()?;
            println!(
                "{} {}",
                "Report written:".green(),
                report.filename.display()
            );
        }
        OutputFormat::Csv => {
            report.write_csv()?;
            println!(
                "{} {}",
                "Report written:".green(),
                report.filename.display()
            );
        }
    }

    if let Some(server) = &args.server {
        push_results(&args, server, &report).await?;
    }

    Ok(())
}

/// Serialize the results and submit them to the aggregation server.
async fn push_results(args: &CheckArgs, server: &str, report: &Report) -> Result<()> {
    let password = args
        .password
        .as_deref()
        .context("a password is required to push results (--password or BERTH_PASSWORD)")?;

    let node_id = args
        .node_id
        .clone()
        .unwrap_or_else(profile_source::node_id);
    let results = report.to_json()?;

    let client = AggregatorClient::new(server);
    let token = client
        .fetch_token(&args.username, password)
        .await
        .context("unable to obtain a token from the aggregation server")?;
    client
        .push_results(&node_id, &results, &token)
        .await
        .context("unable to push results to the aggregation server")?;

    println!(
        "{} node {} reported to {}",
        "Results pushed:".green(),
        node_id.bold(),
        server
    );
    Ok(())
}

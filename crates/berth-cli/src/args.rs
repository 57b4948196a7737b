//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Container-host security auditor with fleet aggregation.
#[derive(Debug, Parser)]
#[command(name = "berth", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the audit checklist on this node.
    Check(CheckArgs),
    /// Run the result aggregation server.
    Serve(ServeArgs),
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored console output.
    Console,
    /// JSON file.
    Json,
    /// YAML file.
    Yaml,
    /// CSV file.
    Csv,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Audit profile: a TOML file path, or an http(s) URL.
    #[arg(short = 'f', long)]
    pub profile: String,

    /// Expected SHA-256 of a remote profile (hex). Fetch fails on mismatch.
    #[arg(long)]
    pub profile_sha256: Option<String>,

    /// Report format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Console)]
    pub output: OutputFormat,

    /// Report file for non-console formats.
    #[arg(long, default_value = "results.json")]
    pub output_file: PathBuf,

    /// Aggregation server base URL; results are pushed when set.
    #[arg(short, long)]
    pub server: Option<String>,

    /// Username for the aggregation server token endpoint.
    #[arg(long, env = "BERTH_USERNAME", default_value = "defaultUser")]
    pub username: String,

    /// Password for the aggregation server token endpoint.
    #[arg(long, env = "BERTH_PASSWORD")]
    pub password: Option<String>,

    /// Node identifier reported to the server (default: machine id).
    #[arg(long)]
    pub node_id: Option<String>,

    /// Per-check timeout in seconds.
    #[arg(long, default_value_t = 60)]
    pub check_timeout: u64,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Server configuration file (TOML).
    #[arg(short, long, default_value = "berth-srv.toml")]
    pub config: PathBuf,
}

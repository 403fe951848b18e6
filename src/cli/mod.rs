//! Command-line entrypoint.
//!
//! This is the process's own runnable shape, not the excluded read-API
//! collaborator described in spec §1 — `opportunities` is a thin read of
//! the opportunity store's ranked set, standing in for that surface layer
//! only to the extent the core needs *something* runnable.

pub mod check;
pub mod opportunities;
pub mod run;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// OddsAxiom — cross-venue prediction-market odds ingestion and arbitrage
/// detection core.
#[derive(Parser, Debug)]
#[command(name = "oddsaxiom")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the full pipeline: workers, arbitrage engine, snapshotter, and
    /// pruner. Blocks until a shutdown signal (Ctrl-C) is received.
    Run(RunArgs),

    /// Validate configuration and connectivity (cache, durable store)
    /// without starting the pipeline.
    Check,

    /// Report which venues are enabled under the current configuration.
    Status,

    /// Query the opportunity store's ranked set and print the currently
    /// active arbitrage opportunities, highest profit margin first.
    Opportunities(OpportunitiesArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Use JSON log lines instead of the default pretty format.
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for the `opportunities` subcommand.
#[derive(Parser, Debug, Default)]
pub struct OpportunitiesArgs {
    /// Maximum number of opportunities to print.
    #[arg(short, long, default_value_t = 20)]
    pub limit: usize,
}

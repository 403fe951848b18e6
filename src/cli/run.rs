//! `oddsaxiom run` — start the full pipeline and block until shutdown.

use tokio::signal;
use tokio::sync::watch;

use crate::app::config::Config;
use crate::app::logging::LogFormat;
use crate::app::orchestrator;
use crate::error::Result;

use super::RunArgs;

/// Load configuration, connect to the stores, spawn every sibling task, and
/// block until Ctrl-C (or an equivalent external shutdown signal) arrives.
///
/// # Errors
/// Returns an error if configuration fails to load or the stores can't be
/// reached at startup.
pub async fn execute(config_path: &std::path::Path, args: RunArgs) -> Result<()> {
    let mut config = Config::load(config_path)?;
    if args.json_logs {
        config.logging.format = LogFormat::Json;
    }
    config.logging.init();

    tracing::info!(venues = ?config.enabled_venues(), "oddsaxiom starting");

    let state = orchestrator::build_state(&config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let orchestrator_task = tokio::spawn(orchestrator::run(config, state, shutdown_rx));

    signal::ctrl_c().await.ok();
    tracing::info!("shutdown signal received, draining tasks");
    let _ = shutdown_tx.send(true);

    match orchestrator_task.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            tracing::error!(error = %err, "orchestrator exited with an error");
            return Err(err);
        }
        Err(join_err) => {
            tracing::error!(error = %join_err, "orchestrator task panicked");
        }
    }

    tracing::info!("oddsaxiom stopped");
    Ok(())
}

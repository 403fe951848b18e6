//! `oddsaxiom check` — validate configuration and connectivity without
//! starting the pipeline.

use crate::app::config::Config;
use crate::app::orchestrator;
use crate::error::Result;

/// Load configuration, then attempt to connect to every external store
/// ([`orchestrator::build_state`] pings Redis and runs SQLite migrations as
/// a side effect of connecting). Prints a pass/fail line per check and
/// returns an error if any check fails, so this can be used as a startup
/// smoke test in CI or a deploy pipeline.
///
/// # Errors
/// Returns an error if configuration fails to load or any store is
/// unreachable.
pub async fn execute(config_path: &std::path::Path) -> Result<()> {
    println!("oddsaxiom check");
    println!();

    let config = match Config::load(config_path) {
        Ok(config) => {
            println!("  [ok]   configuration loaded and validated");
            config
        }
        Err(err) => {
            println!("  [fail] configuration: {err}");
            return Err(err);
        }
    };

    match orchestrator::build_state(&config).await {
        Ok(_state) => {
            println!("  [ok]   cache/ordered-log reachable at {}", config.store.redis_url);
            println!("  [ok]   durable store reachable at {}", config.store.database_url);
        }
        Err(err) => {
            println!("  [fail] store connectivity: {err}");
            return Err(err);
        }
    }

    println!();
    println!("all checks passed");
    Ok(())
}

//! Builds every shared handle from [`Config`], then spawns the full sibling
//! task set — one task per enabled worker, plus the arbitrage engine, the
//! snapshotter, and the pruner — and blocks until shutdown.
//!
//! Per §5/§9: tasks are spawned at startup and cancelled at shutdown via a
//! single `watch` channel; every task drains within a bounded period before
//! the process exits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::engine::{ArbitrageEngine, EngineConfig};
use crate::core::publish::Publisher;
use crate::core::query::LiveQueryAssembler;
use crate::core::snapshot::{pruner::Pruner, Snapshotter};
use crate::core::store::db;
use crate::core::store::redis_backend::RedisStore;
use crate::core::store::sqlite_backend::SqliteDurableStore;
use crate::core::store::{Broadcaster, Cache, DurableStore, OpportunityStore, OrderedLog};
use crate::core::workers::{self, Worker};
use crate::error::Result;

use super::config::Config;
use super::state::AppState;

/// How long a spawned task is given to react to the shutdown signal and
/// return before the process gives up waiting on it.
const DRAIN_PERIOD: Duration = Duration::from_secs(2);

/// Connect to Redis and SQLite and assemble every shared handle the
/// pipeline's tasks need. Does not spawn anything.
///
/// # Errors
/// Returns an error if Redis or the SQLite pool can't be reached, or if
/// pending migrations fail to apply.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let redis = RedisStore::connect(&config.store.redis_url)
        .await?
        .with_stream_maxlen(config.store.stream_maxlen);

    let cache: Arc<dyn Cache> = Arc::new(redis.clone());
    let ordered_log: Arc<dyn OrderedLog> = Arc::new(redis.clone());
    let broadcaster: Arc<dyn Broadcaster> = Arc::new(redis.clone());
    let opportunity_store: Arc<dyn OpportunityStore> = Arc::new(redis.clone());

    let pool = db::create_pool(&config.store.database_url)?;
    db::run_migrations(&pool)?;
    let durable_store: Arc<dyn DurableStore> = Arc::new(SqliteDurableStore::new(pool));

    let publisher = Arc::new(Publisher::new(
        cache.clone(),
        ordered_log.clone(),
        broadcaster.clone(),
        config.store.live_cache_ttl(),
    ));

    let live_query = Arc::new(LiveQueryAssembler::new(
        cache.clone(),
        config.query.result_cache_ttl(),
    ));

    Ok(AppState {
        cache,
        ordered_log,
        broadcaster,
        opportunity_store,
        durable_store,
        publisher,
        live_query,
    })
}

/// Every venue worker enabled by `config`, boxed behind the [`Worker`]
/// trait object so [`workers::run_worker`] can drive them uniformly.
fn build_workers(config: &Config) -> Vec<Box<dyn Worker>> {
    let mut out: Vec<Box<dyn Worker>> = Vec::new();
    let venues = &config.venues;

    if venues.polymarket.enabled {
        out.push(Box::new(workers::polymarket::PolymarketWorker::new()));
    }
    if venues.kalshi.enabled {
        out.push(Box::new(workers::kalshi::KalshiWorker::new()));
    }
    if venues.predictit.enabled {
        out.push(Box::new(workers::predictit::PredictItWorker::new()));
    }
    if venues.limitless.enabled {
        out.push(Box::new(workers::limitless::LimitlessWorker::new()));
    }
    if venues.robinhood.enabled {
        out.push(Box::new(workers::robinhood::RobinhoodWorker::new()));
    }
    if venues.sportsbook_aggregator.enabled {
        out.push(Box::new(workers::sportsbook_aggregator::SportsbookAggregatorWorker::new(
            venues.sportsbook_aggregator.api_key.clone(),
        )));
    }
    if venues.coinbase.enabled {
        out.push(Box::new(workers::coinbase::CoinbaseWorker::new(
            venues.coinbase.api_key.clone(),
        )));
    }
    if venues.gemini.enabled {
        out.push(Box::new(workers::gemini::GeminiWorker::new(
            venues.gemini.api_key.clone(),
        )));
    }

    out
}

/// Spawn every sibling task (workers, engine, snapshotter, pruner) and run
/// until `shutdown` fires, then wait out [`DRAIN_PERIOD`] for each to
/// finish before returning.
pub async fn run(config: Config, state: AppState, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let mut handles: Vec<JoinHandle<()>> = Vec::new();

    for worker in build_workers(&config) {
        let publisher = state.publisher.clone();
        let shutdown_rx = shutdown.clone();
        handles.push(tokio::spawn(workers::run_worker(worker, publisher, shutdown_rx)));
    }

    let engine_config = EngineConfig {
        min_profit: config.engine.min_profit,
        detection_interval: config.engine.detection_interval(),
        recluster_interval_cycles: config.engine.recluster_interval_cycles,
        opportunity_ttl: config.engine.opportunity_ttl(),
    };
    let engine = ArbitrageEngine::new(
        engine_config,
        state.ordered_log.clone(),
        state.opportunity_store.clone(),
        state.broadcaster.clone(),
        config.engine.matcher_cache_ttl(),
    );
    handles.push(tokio::spawn(engine.run(shutdown.clone())));

    let snapshotter = Snapshotter::new(
        state.cache.clone(),
        state.durable_store.clone(),
        config.retention.snapshot_interval(),
        config.retention.snapshot_startup_grace(),
        config.retention.snapshot_batch_size,
    );
    handles.push(tokio::spawn(snapshotter.run(shutdown.clone())));

    let pruner = Pruner::new(
        state.durable_store.clone(),
        config.retention.pruner_interval(),
        config.retention.retention_days,
        config.retention.stale_days,
    );
    handles.push(tokio::spawn(pruner.run(shutdown.clone())));

    tracing::info!(tasks = handles.len(), "orchestrator started all sibling tasks");

    // Block until a shutdown is requested, then give every task up to
    // DRAIN_PERIOD to notice and return before we stop waiting on it.
    let _ = shutdown.changed().await;
    tracing::info!("shutdown requested, draining tasks");

    let drain = tokio::time::timeout(DRAIN_PERIOD, futures_join_all(handles));
    if drain.await.is_err() {
        tracing::warn!("one or more tasks did not drain within the bounded period");
    }

    Ok(())
}

/// Minimal stand-in for `futures::future::join_all` so the orchestrator
/// doesn't need an extra dependency just for this one call site.
async fn futures_join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_workers_respects_default_enablement() {
        let config = Config::default();
        let workers = build_workers(&config);
        let slugs: Vec<&str> = workers.iter().map(|w| w.venue_slug()).collect();
        assert!(slugs.contains(&"polymarket"));
        assert!(slugs.contains(&"kalshi"));
        assert!(!slugs.contains(&"coinbase"));
    }

    #[test]
    fn build_workers_includes_authenticated_venues_once_enabled() {
        let mut config = Config::default();
        config.venues.coinbase.enabled = true;
        let workers = build_workers(&config);
        let slugs: Vec<&str> = workers.iter().map(|w| w.venue_slug()).collect();
        assert!(slugs.contains(&"coinbase"));
    }
}

//! Coarse-interval retention: deletes old durable snapshots and marks stale
//! markets inactive.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::core::store::DurableStore;

/// Deletes snapshots older than the retention window on a coarse interval,
/// and — once per day — marks any durable market record not updated within
/// the stale horizon as inactive.
///
/// The "mark stale" half of this component has no durable-store counterpart
/// beyond the snapshot rows this crate defines (no separate `markets`
/// table), so staleness here is exposed as a query the caller (the
/// live-query assembler, or an operator) can run on demand via
/// [`Pruner::stale_cutoff`], rather than a write this task performs itself.
pub struct Pruner {
    durable_store: Arc<dyn DurableStore>,
    run_interval: Duration,
    retention: chrono::Duration,
    stale_horizon: chrono::Duration,
}

impl Pruner {
    #[must_use]
    pub fn new(
        durable_store: Arc<dyn DurableStore>,
        run_interval: Duration,
        retention_days: i64,
        stale_days: i64,
    ) -> Self {
        Self {
            durable_store,
            run_interval,
            retention: chrono::Duration::days(retention_days),
            stale_horizon: chrono::Duration::days(stale_days),
        }
    }

    /// The cutoff timestamp before which a durable record is considered
    /// stale, as of `now`.
    #[must_use]
    pub fn stale_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.stale_horizon
    }

    pub async fn run(self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.run_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => self.prune_once().await,
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("pruner stopped");
    }

    async fn prune_once(&self) {
        let cutoff = Utc::now() - self.retention;
        match self.durable_store.prune_older_than(cutoff).await {
            Ok(deleted) => tracing::info!(deleted, "pruned snapshots older than retention window"),
            Err(err) => tracing::warn!(error = %err, "prune cycle failed"),
        }
    }
}

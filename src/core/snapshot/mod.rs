//! Periodic durable capture of the live cache into history rows.

pub mod pruner;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::core::domain::OddsSnapshot;
use crate::core::store::{Cache, DurableStore};

/// Rows with non-positive implied probability are dropped — they can only
/// arise from a stale/partial write and are never meaningful history.
fn is_admissible(implied_prob: f64) -> bool {
    implied_prob > 0.0
}

/// Scans every live cache entry on a fixed interval and bulk-inserts its
/// per-outcome rows into durable storage, batching writes so one scan never
/// holds a single oversized insert.
pub struct Snapshotter {
    cache: Arc<dyn Cache>,
    durable_store: Arc<dyn DurableStore>,
    interval: Duration,
    startup_grace: Duration,
    batch_size: usize,
}

impl Snapshotter {
    #[must_use]
    pub fn new(
        cache: Arc<dyn Cache>,
        durable_store: Arc<dyn DurableStore>,
        interval: Duration,
        startup_grace: Duration,
        batch_size: usize,
    ) -> Self {
        Self {
            cache,
            durable_store,
            interval,
            startup_grace,
            batch_size,
        }
    }

    /// Run until `shutdown` fires, waiting out the startup grace period
    /// before the first scan so a freshly booted process doesn't snapshot an
    /// empty or still-warming cache.
    pub async fn run(self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        tokio::select! {
            () = tokio::time::sleep(self.startup_grace) => {}
            result = shutdown.changed() => {
                if result.is_err() || *shutdown.borrow() {
                    return;
                }
            }
        }

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => self.snapshot_once().await,
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("snapshotter stopped");
    }

    /// One scan-and-insert pass. Errors reading the cache or writing a batch
    /// are logged and the pass continues with the next batch — a durable
    /// store outage degrades the snapshotter only, per the error-handling
    /// design; the live path is unaffected.
    async fn snapshot_once(&self) {
        let entries = match self.cache.scan_live().await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "snapshotter failed to scan live cache");
                return;
            }
        };

        let captured_at = Utc::now();
        let rows: Vec<OddsSnapshot> = entries
            .iter()
            .flat_map(|entry| {
                entry.outcomes.iter().filter(|o| is_admissible(o.implied_prob)).map(|outcome| OddsSnapshot {
                    market_id: entry.external_market_id.clone(),
                    venue_slug: entry.venue_slug.clone(),
                    outcome_index: outcome.index,
                    outcome_name: outcome.name.clone(),
                    price: outcome.price,
                    implied_prob: outcome.implied_prob,
                    captured_at,
                })
            })
            .collect();

        let mut inserted = 0;
        for chunk in rows.chunks(self.batch_size.max(1)) {
            match self.durable_store.insert_snapshots(chunk).await {
                Ok(count) => inserted += count,
                Err(err) => {
                    tracing::warn!(error = %err, "snapshotter batch insert failed");
                }
            }
        }
        tracing::info!(rows = inserted, "snapshot cycle complete");
    }
}

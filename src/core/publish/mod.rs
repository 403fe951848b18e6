//! Writes a worker's normalised batch to the live cache and the ordered log,
//! and announces the batch on the change-notice channel.
//!
//! [`Publisher::publish`] is the pipeline's single entry point between the
//! workers and everything downstream (the arbitrage engine, the snapshotter,
//! the live-query assembler) — nothing else writes to the cache or appends
//! to the ordered log.

pub mod url;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::core::domain::{LiveCacheEntry, NormalisedQuote};
use crate::core::store::{Broadcaster, Cache, OrderedLog};
use crate::error::Result;

/// The ordered-log stream every normalised quote is appended to, consumed by
/// the arbitrage engine's consumer subtask via the `arbengine` group.
pub const NORMALIZED_STREAM: &str = "odds:normalized";

/// Single entry point for publishing a worker's batch. Construct once per
/// process and share via `Arc` across every worker task.
pub struct Publisher {
    cache: Arc<dyn Cache>,
    ordered_log: Arc<dyn OrderedLog>,
    broadcaster: Arc<dyn Broadcaster>,
    live_cache_ttl: Duration,
}

impl Publisher {
    #[must_use]
    pub fn new(
        cache: Arc<dyn Cache>,
        ordered_log: Arc<dyn OrderedLog>,
        broadcaster: Arc<dyn Broadcaster>,
        live_cache_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            ordered_log,
            broadcaster,
            live_cache_ttl,
        }
    }

    /// Publish one worker-tick's normalised quotes as a single pipelined
    /// batch:
    ///
    /// 1. Group by `(venue_slug, external_market_id)` and upsert a fresh
    ///    [`LiveCacheEntry`] per key — `LiveCacheEntry::from_batch` rebuilds
    ///    the entry from scratch each time rather than patching fields in
    ///    place, so a market whose outcome count shrinks between batches
    ///    never leaves stale `outcome_*` fields behind (this is this
    ///    pipeline's chosen resolution of the torn-write-avoidance contract
    ///    in favour of rewrite-on-every-batch over patch-in-place).
    /// 2. Append one ordered-log entry per quote to [`NORMALIZED_STREAM`].
    /// 3. Broadcast one change notice for the whole call.
    ///
    /// A batch is assumed to originate from a single worker tick and
    /// therefore a single venue; `venue_slug` on the change notice is taken
    /// from the first quote.
    ///
    /// # Errors
    /// Returns an error on the first cache, log, or broadcast failure. The
    /// caller (the worker's poll loop) logs and drops the batch rather than
    /// retrying within the same tick.
    pub async fn publish(&self, quotes: &[NormalisedQuote]) -> Result<()> {
        if quotes.is_empty() {
            return Ok(());
        }

        let mut keys_seen = Vec::new();
        let mut groups: HashMap<(String, String), Vec<NormalisedQuote>> = HashMap::new();
        for quote in quotes {
            let key = (quote.venue_slug.clone(), quote.external_market_id.clone());
            if !groups.contains_key(&key) {
                keys_seen.push(key.clone());
            }
            groups.entry(key).or_default().push(quote.clone());
        }

        for key in &keys_seen {
            let Some(batch) = groups.get(key) else { continue };
            if let Some(entry) = LiveCacheEntry::from_batch(batch) {
                self.cache.set_live(&entry, self.live_cache_ttl).await?;
            }
        }

        for quote in quotes {
            let payload = serde_json::to_vec(quote)?;
            self.ordered_log.append(NORMALIZED_STREAM, &payload).await?;
        }

        let venue_slug = &quotes[0].venue_slug;
        self.broadcaster
            .publish_batch_notice(venue_slug, quotes.len())
            .await?;

        Ok(())
    }
}

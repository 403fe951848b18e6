//! The arbitrage engine: a single logical task built from two cooperating
//! subtasks sharing one in-memory buffer.
//!
//! The consumer subtask reads the ordered log via a durable consumer group,
//! resolves each quote's raw title to its canonical representative, and
//! folds it into the buffer. The detection subtask fires on a fixed
//! interval, runs [`detector::detect_arbitrage`] over every buffered title,
//! and publishes whatever it finds. Both run on the same task (spawned
//! together, cancelled together) and share the buffer and canonical-title
//! map without locking, since per §5 the buffer is owned exclusively by this
//! task — no other task reads or mutates it.

pub mod buffer;
pub mod detector;
pub mod stake;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use crate::core::domain::NormalisedQuote;
use crate::core::matcher::cache::MatcherCache;
use crate::core::matcher::Candidate;
use crate::core::publish::NORMALIZED_STREAM;
use crate::core::store::{Broadcaster, OpportunityStore, OrderedLog};

use buffer::OpportunityBuffer;
use detector::detect_arbitrage;

/// Consumer group name the engine reads `NORMALIZED_STREAM` under. Durable:
/// a restarted engine resumes from its own unacknowledged backlog rather
/// than the stream head.
const CONSUMER_GROUP: &str = "arbengine";
const CONSUMER_NAME: &str = "arbengine-1";

/// Entries read per consumer-subtask tick.
const CONSUME_BATCH_SIZE: usize = 100;

/// How long a buffered title may go without an update before it's
/// considered stale and excluded from detection.
const STALE_HORIZON: Duration = Duration::from_secs(30 * 60);

/// Tunables the engine is constructed with — all have spec-reference
/// defaults, overridable from [`crate::app::config::Config`].
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub min_profit: f64,
    pub detection_interval: Duration,
    pub recluster_interval_cycles: u32,
    pub opportunity_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_profit: 0.001,
            detection_interval: Duration::from_secs(5),
            recluster_interval_cycles: 60,
            opportunity_ttl: Duration::from_secs(5 * 60),
        }
    }
}

/// Owns the buffer, the canonical-title map cache, and the handles to the
/// ordered log / opportunity store / broadcaster. Constructed once at
/// startup and run to completion (i.e. until shutdown) by [`ArbitrageEngine::run`].
pub struct ArbitrageEngine {
    config: EngineConfig,
    ordered_log: Arc<dyn OrderedLog>,
    opportunity_store: Arc<dyn OpportunityStore>,
    broadcaster: Arc<dyn Broadcaster>,
    matcher_cache: MatcherCache,
    buffer: OpportunityBuffer,
    /// `(raw_title, venue_slug, category)` side maps the matcher needs,
    /// populated as quotes arrive so reclustering has every title's
    /// metadata without re-deriving it from the buffer.
    title_meta: std::collections::HashMap<String, (String, Option<crate::core::domain::Category>)>,
}

impl ArbitrageEngine {
    #[must_use]
    pub fn new(
        config: EngineConfig,
        ordered_log: Arc<dyn OrderedLog>,
        opportunity_store: Arc<dyn OpportunityStore>,
        broadcaster: Arc<dyn Broadcaster>,
        matcher_cache_ttl: Duration,
    ) -> Self {
        Self {
            config,
            ordered_log,
            opportunity_store,
            broadcaster,
            matcher_cache: MatcherCache::new(matcher_cache_ttl),
            buffer: OpportunityBuffer::new(),
            title_meta: std::collections::HashMap::new(),
        }
    }

    /// Run the consumer and detection subtasks until `shutdown` fires.
    /// Cooperative: both subtasks interleave on the same task via
    /// `tokio::select!`, consistent with §9's guidance that, in a language
    /// with channels, the consumer/detector pair can share one task holding
    /// the buffer rather than needing two.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        if let Err(err) = self
            .ordered_log
            .ensure_consumer_group(NORMALIZED_STREAM, CONSUMER_GROUP)
            .await
        {
            tracing::error!(error = %err, "engine failed to create consumer group, exiting");
            return;
        }

        let mut detection_ticker = tokio::time::interval(self.config.detection_interval);
        detection_ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut cycle: u64 = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = detection_ticker.tick() => {
                    self.consume_available().await;
                    self.detect_and_publish().await;
                    cycle += 1;
                    if cycle % u64::from(self.config.recluster_interval_cycles.max(1)) == 0 {
                        self.recluster();
                    }
                    self.buffer.sweep_stale(STALE_HORIZON, Utc::now());
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("arbitrage engine stopped");
    }

    /// Drain up to [`CONSUME_BATCH_SIZE`] unacknowledged log entries into the
    /// buffer, resolving each quote's title against the current canonical
    /// map. Malformed entries are logged and skipped, never fatal to the
    /// subtask.
    async fn consume_available(&mut self) {
        let entries = match self
            .ordered_log
            .read_group(NORMALIZED_STREAM, CONSUMER_GROUP, CONSUMER_NAME, CONSUME_BATCH_SIZE)
            .await
        {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "engine consumer read failed");
                return;
            }
        };
        if entries.is_empty() {
            return;
        }

        let map = self.current_canonical_map();

        for (id, payload) in entries {
            match serde_json::from_slice::<NormalisedQuote>(&payload) {
                Ok(quote) if quote.is_admissible() => {
                    let canonical = map.resolve(&quote.market_title).to_string();
                    self.title_meta
                        .entry(quote.market_title.clone())
                        .or_insert_with(|| (quote.venue_slug.clone(), Some(quote.category)));
                    self.buffer.update(&canonical, quote.category, std::slice::from_ref(&quote));
                }
                Ok(_) => tracing::debug!("dropping quote outside admissible implied-prob range"),
                Err(err) => tracing::warn!(error = %err, "failed to parse ordered-log entry"),
            }
            if let Err(err) = self.ordered_log.ack(NORMALIZED_STREAM, CONSUMER_GROUP, &id).await {
                tracing::warn!(error = %err, entry_id = %id, "failed to ack ordered-log entry");
            }
        }
    }

    /// The matcher's latest canonical-title map, recomputed (subject to
    /// [`MatcherCache`]'s own TTL) from every title currently known to the
    /// buffer or buffered via `title_meta`.
    fn current_canonical_map(&self) -> crate::core::domain::CanonicalTitleMap {
        let candidates: Vec<Candidate> = self
            .title_meta
            .iter()
            .map(|(title, (venue_slug, category))| Candidate {
                title: title.clone(),
                venue_slug: venue_slug.clone(),
                category: *category,
            })
            .collect();
        self.matcher_cache.resolve(&candidates)
    }

    /// Run detection over every non-stale buffered title and publish
    /// whatever opportunities it finds.
    async fn detect_and_publish(&mut self) {
        let now = Utc::now();
        let titles: Vec<String> = self.buffer.titles().map(str::to_string).collect();
        for title in titles {
            let Some(entry) = self.buffer.get(&title) else { continue };
            if entry.state == buffer::TitleState::Stale {
                continue;
            }
            let best_legs = entry.best_legs();
            let Some(opportunity) =
                detect_arbitrage(&title, entry.category, &best_legs, now)
            else {
                continue;
            };
            if opportunity.expected_profit <= self.config.min_profit {
                continue;
            }

            if let Err(err) = self.broadcaster.publish_alert(&opportunity).await {
                tracing::warn!(error = %err, "failed to broadcast arb alert");
            }
            if let Err(err) = self
                .opportunity_store
                .upsert(&opportunity, self.config.opportunity_ttl)
                .await
            {
                tracing::warn!(error = %err, "failed to upsert opportunity");
                continue;
            }
            if let Some(entry) = self.buffer.get_mut(&title) {
                entry.mark_arb_hot();
            }
            tracing::info!(
                canonical_title = %title,
                expected_profit = opportunity.expected_profit,
                legs = opportunity.legs.len(),
                "arbitrage opportunity detected"
            );
        }
    }

    /// Re-run the matcher over every title currently known and merge any
    /// buffer keys whose canonical representative changed. Forces the
    /// matcher cache to recompute regardless of its own TTL, since a
    /// recluster cycle's entire purpose is to refresh the clustering.
    fn recluster(&mut self) {
        self.matcher_cache.invalidate();
        let map = self.current_canonical_map();

        let current_titles: Vec<String> = self.buffer.titles().map(str::to_string).collect();
        let mut merges = 0;
        for title in current_titles {
            let canonical = map.resolve(&title).to_string();
            if canonical != title && self.buffer.get(&title).is_some() {
                self.buffer.merge_into(&title, &canonical);
                merges += 1;
            }
        }
        tracing::info!(merges, "engine reclustered buffer titles");
    }
}

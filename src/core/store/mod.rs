//! Storage abstractions the rest of the pipeline is written against.
//!
//! Five small traits, one per Redis-backed primitive the ingestion/matching
//! pipeline needs plus the durable history store:
//!
//! - [`Cache`] — the live per-market hash, TTL'd
//! - [`OrderedLog`] — the durable, consumer-group-replayable update log
//! - [`Broadcaster`] — the change-notice and alert pub/sub channels
//! - [`OpportunityStore`] — the ranked set of currently active arbitrage
//!   opportunities
//! - [`DurableStore`] — the SQLite history table written by the snapshotter
//!
//! Production wires these to [`redis_backend`]/[`sqlite_backend`]; tests use
//! `crate::testkit`'s in-memory implementations so the pipeline's own logic
//! can be exercised without a live Redis or SQLite file.

pub mod db;
pub mod redis_backend;
pub mod sqlite_backend;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::domain::{LiveCacheEntry, Opportunity, OddsSnapshot};
use crate::error::Result;

/// The live cache: one entry per `(venue_slug, external_market_id)`, TTL'd
/// so a venue that stops reporting silently ages out rather than serving
/// stale odds forever.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn set_live(&self, entry: &LiveCacheEntry, ttl: Duration) -> Result<()>;
    async fn get_live(&self, venue_slug: &str, market_id: &str) -> Result<Option<LiveCacheEntry>>;
    async fn delete_live(&self, venue_slug: &str, market_id: &str) -> Result<()>;
    /// Every currently live entry, for the read-side assembler and for the
    /// engine's recluster pass.
    async fn scan_live(&self) -> Result<Vec<LiveCacheEntry>>;

    /// `odds:canonical_map` — the matcher's serialised `{raw_title ->
    /// canonical_title}`, TTL'd so other processes (e.g. the read API) can
    /// observe the engine's current clustering without calling it directly.
    async fn set_canonical_map(&self, serialised: &str, ttl: Duration) -> Result<()>;
    async fn get_canonical_map(&self) -> Result<Option<String>>;
}

/// The durable, replayable log of normalised-quote-batch updates. Wraps a
/// Redis Stream with consumer-group semantics: each engine subtask reads
/// with its own consumer name, acknowledging entries once processed so a
/// restarted subtask resumes from where it left off rather than from the
/// stream head.
#[async_trait]
pub trait OrderedLog: Send + Sync {
    /// Create `group` on `stream` if it doesn't already exist. Idempotent.
    async fn ensure_consumer_group(&self, stream: &str, group: &str) -> Result<()>;

    /// Append one serialized payload, returning the log's assigned entry id.
    async fn append(&self, stream: &str, payload: &[u8]) -> Result<String>;

    /// Read up to `count` unconsumed entries for `consumer` within `group`.
    async fn read_group(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
    ) -> Result<Vec<(String, Vec<u8>)>>;

    async fn ack(&self, stream: &str, group: &str, id: &str) -> Result<()>;
}

/// The two pub/sub channels the engine and query layer use to wake up
/// interested readers without polling.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// `odds:updates` — one message per publish batch:
    /// `{type: "odds_batch", venue, count}`.
    async fn publish_batch_notice(&self, venue_slug: &str, count: usize) -> Result<()>;

    /// `arb:alerts` — `{type: "arb_alert", data: Opportunity}`.
    async fn publish_alert(&self, opportunity: &Opportunity) -> Result<()>;
}

/// The ranked set of currently active opportunities, ordered by expected
/// profit so the highest-profit opportunity is always cheap to fetch.
#[async_trait]
pub trait OpportunityStore: Send + Sync {
    async fn upsert(&self, opportunity: &Opportunity, ttl: Duration) -> Result<()>;
    async fn remove(&self, id: &str) -> Result<()>;
    /// Highest-`expected_profit`-first, capped at `limit`.
    async fn top(&self, limit: usize) -> Result<Vec<Opportunity>>;
}

/// The durable history table. Append-only from the snapshotter's point of
/// view; the pruner is the only writer that deletes rows.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn insert_snapshots(&self, snapshots: &[OddsSnapshot]) -> Result<usize>;
    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;
    async fn count(&self) -> Result<i64>;
}

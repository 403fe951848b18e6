//! In-memory implementations of the `core::store` traits, so unit and
//! integration tests exercise the pipeline's own logic without a live Redis
//! or SQLite file.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests), mirroring how the production backends are gated
//! behind their respective modules.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::core::domain::{LiveCacheEntry, OddsSnapshot, Opportunity};
use crate::core::store::{Broadcaster, Cache, DurableStore, OpportunityStore, OrderedLog};
use crate::error::Result;

/// In-memory [`Cache`]. TTLs are tracked but never actively swept; a getter
/// that finds an expired entry returns `None` and removes it lazily.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<(String, String), (LiveCacheEntry, std::time::Instant, Duration)>>,
    canonical_map: Mutex<Option<(String, std::time::Instant, Duration)>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn set_live(&self, entry: &LiveCacheEntry, ttl: Duration) -> Result<()> {
        let key = (entry.venue_slug.clone(), entry.external_market_id.clone());
        self.entries
            .lock()
            .insert(key, (entry.clone(), std::time::Instant::now(), ttl));
        Ok(())
    }

    async fn get_live(&self, venue_slug: &str, market_id: &str) -> Result<Option<LiveCacheEntry>> {
        let key = (venue_slug.to_string(), market_id.to_string());
        let mut entries = self.entries.lock();
        match entries.get(&key) {
            Some((entry, inserted_at, ttl)) if inserted_at.elapsed() < *ttl => {
                Ok(Some(entry.clone()))
            }
            Some(_) => {
                entries.remove(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete_live(&self, venue_slug: &str, market_id: &str) -> Result<()> {
        self.entries
            .lock()
            .remove(&(venue_slug.to_string(), market_id.to_string()));
        Ok(())
    }

    async fn scan_live(&self) -> Result<Vec<LiveCacheEntry>> {
        let entries = self.entries.lock();
        Ok(entries
            .values()
            .filter(|(_, inserted_at, ttl)| inserted_at.elapsed() < *ttl)
            .map(|(entry, _, _)| entry.clone())
            .collect())
    }

    async fn set_canonical_map(&self, serialised: &str, ttl: Duration) -> Result<()> {
        *self.canonical_map.lock() = Some((serialised.to_string(), std::time::Instant::now(), ttl));
        Ok(())
    }

    async fn get_canonical_map(&self) -> Result<Option<String>> {
        let mut guard = self.canonical_map.lock();
        match guard.as_ref() {
            Some((serialised, inserted_at, ttl)) if inserted_at.elapsed() < *ttl => {
                Ok(Some(serialised.clone()))
            }
            Some(_) => {
                *guard = None;
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

/// In-memory [`OrderedLog`]. Each stream is a `VecDeque` of
/// `(id, payload, acked)` entries; `read_group` hands back unacked entries
/// in order and `ack` marks them consumed, matching the append-then-ack
/// contract of a real Redis Stream consumer group closely enough for
/// pipeline-logic tests.
#[derive(Default)]
pub struct MemoryOrderedLog {
    streams: Mutex<HashMap<String, VecDeque<(String, Vec<u8>, bool)>>>,
    next_id: Mutex<u64>,
}

impl MemoryOrderedLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderedLog for MemoryOrderedLog {
    async fn ensure_consumer_group(&self, stream: &str, _group: &str) -> Result<()> {
        self.streams.lock().entry(stream.to_string()).or_default();
        Ok(())
    }

    async fn append(&self, stream: &str, payload: &[u8]) -> Result<String> {
        let mut next_id = self.next_id.lock();
        let id = format!("{}-0", *next_id);
        *next_id += 1;
        self.streams
            .lock()
            .entry(stream.to_string())
            .or_default()
            .push_back((id.clone(), payload.to_vec(), false));
        Ok(id)
    }

    async fn read_group(
        &self,
        stream: &str,
        _group: &str,
        _consumer: &str,
        count: usize,
    ) -> Result<Vec<(String, Vec<u8>)>> {
        let streams = self.streams.lock();
        let Some(entries) = streams.get(stream) else {
            return Ok(Vec::new());
        };
        Ok(entries
            .iter()
            .filter(|(_, _, acked)| !acked)
            .take(count)
            .map(|(id, payload, _)| (id.clone(), payload.clone()))
            .collect())
    }

    async fn ack(&self, stream: &str, _group: &str, id: &str) -> Result<()> {
        if let Some(entries) = self.streams.lock().get_mut(stream) {
            if let Some(entry) = entries.iter_mut().find(|(entry_id, _, _)| entry_id == id) {
                entry.2 = true;
            }
        }
        Ok(())
    }
}

/// In-memory [`Broadcaster`]. Published messages are retained so tests can
/// assert on what was announced; there are no live subscribers to fan out
/// to.
#[derive(Default)]
pub struct MemoryBroadcaster {
    pub batch_notices: Mutex<Vec<(String, usize)>>,
    pub alerts: Mutex<Vec<Opportunity>>,
}

impl MemoryBroadcaster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Broadcaster for MemoryBroadcaster {
    async fn publish_batch_notice(&self, venue_slug: &str, count: usize) -> Result<()> {
        self.batch_notices.lock().push((venue_slug.to_string(), count));
        Ok(())
    }

    async fn publish_alert(&self, opportunity: &Opportunity) -> Result<()> {
        self.alerts.lock().push(opportunity.clone());
        Ok(())
    }
}

/// In-memory [`OpportunityStore`], ranked by `expected_profit` on every
/// read rather than maintaining a sorted structure — fine at test scale.
#[derive(Default)]
pub struct MemoryOpportunityStore {
    opportunities: Mutex<HashMap<String, Opportunity>>,
}

impl MemoryOpportunityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OpportunityStore for MemoryOpportunityStore {
    async fn upsert(&self, opportunity: &Opportunity, _ttl: Duration) -> Result<()> {
        self.opportunities
            .lock()
            .insert(opportunity.id.clone(), opportunity.clone());
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.opportunities.lock().remove(id);
        Ok(())
    }

    async fn top(&self, limit: usize) -> Result<Vec<Opportunity>> {
        let mut all: Vec<Opportunity> = self.opportunities.lock().values().cloned().collect();
        all.sort_by(|a, b| {
            b.expected_profit
                .partial_cmp(&a.expected_profit)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        all.truncate(limit);
        Ok(all)
    }
}

/// In-memory [`DurableStore`].
#[derive(Default)]
pub struct MemoryDurableStore {
    snapshots: Mutex<Vec<OddsSnapshot>>,
}

impl MemoryDurableStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DurableStore for MemoryDurableStore {
    async fn insert_snapshots(&self, snapshots: &[OddsSnapshot]) -> Result<usize> {
        self.snapshots.lock().extend_from_slice(snapshots);
        Ok(snapshots.len())
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut snapshots = self.snapshots.lock();
        let before = snapshots.len();
        snapshots.retain(|s| s.captured_at >= cutoff);
        Ok(before - snapshots.len())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.snapshots.lock().len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::Category;
    use chrono::Duration as ChronoDuration;

    fn entry(venue: &str, market: &str) -> LiveCacheEntry {
        LiveCacheEntry {
            venue_slug: venue.into(),
            external_market_id: market.into(),
            title: "Will it rain?".into(),
            category: Category::Science,
            url: None,
            volume_24h: None,
            volume_usd: None,
            liquidity_usd: None,
            updated_at: Utc::now(),
            outcomes: vec![],
        }
    }

    #[tokio::test]
    async fn cache_round_trips_and_expires() {
        let cache = MemoryCache::new();
        cache
            .set_live(&entry("kalshi", "m1"), Duration::from_millis(10))
            .await
            .unwrap();
        assert!(cache.get_live("kalshi", "m1").await.unwrap().is_some());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.get_live("kalshi", "m1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ordered_log_read_then_ack_hides_entry() {
        let log = MemoryOrderedLog::new();
        log.ensure_consumer_group("stream", "group").await.unwrap();
        let id = log.append("stream", b"payload").await.unwrap();
        let unacked = log.read_group("stream", "group", "c1", 10).await.unwrap();
        assert_eq!(unacked.len(), 1);
        log.ack("stream", "group", &id).await.unwrap();
        let unacked = log.read_group("stream", "group", "c1", 10).await.unwrap();
        assert!(unacked.is_empty());
    }

    #[tokio::test]
    async fn durable_store_prunes_by_age() {
        let store = MemoryDurableStore::new();
        let old = OddsSnapshot {
            market_id: "m1".into(),
            venue_slug: "kalshi".into(),
            outcome_index: 0,
            outcome_name: "Yes".into(),
            price: 0.4,
            implied_prob: 0.4,
            captured_at: Utc::now() - ChronoDuration::days(10),
        };
        store.insert_snapshots(&[old]).await.unwrap();
        let pruned = store
            .prune_older_than(Utc::now() - ChronoDuration::days(1))
            .await
            .unwrap();
        assert_eq!(pruned, 1);
        assert_eq!(store.count().await.unwrap(), 0);
    }
}

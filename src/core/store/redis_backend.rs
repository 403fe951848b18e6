//! Redis-backed implementations of [`Cache`], [`OrderedLog`], [`Broadcaster`]
//! and [`OpportunityStore`].
//!
//! Key layout matches the contract spelled out for external consumers (the
//! read API, notification fan-out) — see `src/core/mod.rs`:
//!
//! - `odds:live:{venue}:{market_id}` — hash, one `json` field, TTL'd
//! - `odds:updates` — broadcast channel, `{type: "odds_batch", venue, count}`
//! - `odds:normalized` — the ordered log stream
//! - `odds:canonical_map` — cached serialised canonical-title map, TTL'd
//! - `arb:active` — sorted set, score = `expected_profit`
//! - `arb:opp:{key}` — hash, one `json` field, TTL'd
//! - `arb:alerts` — broadcast channel, `{type: "arb_alert", data: Opportunity}`

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::json;

use super::{Broadcaster, Cache, OpportunityStore, OrderedLog};
use crate::core::domain::{LiveCacheEntry, Opportunity};
use crate::error::{Error, Result};

const LIVE_PREFIX: &str = "odds:live";
const UPDATES_STREAM: &str = "odds:normalized";
const BATCH_NOTICE_CHANNEL: &str = "odds:updates";
const CANONICAL_MAP_KEY: &str = "odds:canonical_map";
const ALERT_CHANNEL: &str = "arb:alerts";
const OPPORTUNITIES_ZSET: &str = "arb:active";
const OPPORTUNITIES_DATA_PREFIX: &str = "arb:opp";
/// Default soft cap on `odds:normalized`'s length — approximate trimming
/// (`~`) is cheaper than exact and the engine only ever needs recent
/// entries. Overridable via [`RedisStore::with_stream_maxlen`] from
/// `stream_maxlen` in [`crate::app::config::Config`].
const DEFAULT_STREAM_MAXLEN: usize = 50_000;

fn live_key(venue_slug: &str, market_id: &str) -> String {
    format!("{LIVE_PREFIX}:{venue_slug}:{market_id}")
}

fn opportunity_data_key(id: &str) -> String {
    format!("{OPPORTUNITIES_DATA_PREFIX}:{id}")
}

/// Thin wrapper around a `redis` connection manager, shared across every
/// task that needs Redis — cloning it is cheap, as `ConnectionManager`
/// multiplexes over a single underlying connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    stream_maxlen: usize,
}

impl RedisStore {
    /// Connect to `redis_url` and build a managed connection that
    /// reconnects automatically on transient failures.
    ///
    /// # Errors
    /// Returns an error if the initial connection cannot be established.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self {
            conn,
            stream_maxlen: DEFAULT_STREAM_MAXLEN,
        })
    }

    /// Override the soft cap on `odds:normalized`'s approximate length.
    #[must_use]
    pub fn with_stream_maxlen(mut self, stream_maxlen: usize) -> Self {
        self.stream_maxlen = stream_maxlen;
        self
    }
}

#[async_trait]
impl Cache for RedisStore {
    async fn set_live(&self, entry: &LiveCacheEntry, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = live_key(&entry.venue_slug, &entry.external_market_id);
        let json = serde_json::to_string(entry)?;
        let _: () = conn.hset(&key, "json", json).await?;
        let _: () = conn.expire(&key, ttl.as_secs() as i64).await?;
        Ok(())
    }

    async fn get_live(&self, venue_slug: &str, market_id: &str) -> Result<Option<LiveCacheEntry>> {
        let mut conn = self.conn.clone();
        let key = live_key(venue_slug, market_id);
        let json: Option<String> = conn.hget(&key, "json").await?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn delete_live(&self, venue_slug: &str, market_id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = live_key(venue_slug, market_id);
        let _: () = conn.del(&key).await?;
        Ok(())
    }

    async fn scan_live(&self) -> Result<Vec<LiveCacheEntry>> {
        let mut conn = self.conn.clone();
        let pattern = format!("{LIVE_PREFIX}:*");
        let keys: Vec<String> = conn.keys(&pattern).await?;
        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let json: Option<String> = conn.hget(&key, "json").await?;
            if let Some(json) = json {
                entries.push(serde_json::from_str(&json)?);
            }
        }
        Ok(entries)
    }

    async fn set_canonical_map(&self, serialised: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(CANONICAL_MAP_KEY, serialised).await?;
        let _: () = conn.expire(CANONICAL_MAP_KEY, ttl.as_secs() as i64).await?;
        Ok(())
    }

    async fn get_canonical_map(&self) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.get(CANONICAL_MAP_KEY).await?)
    }
}

#[async_trait]
impl OrderedLog for RedisStore {
    async fn ensure_consumer_group(&self, stream: &str, group: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(stream)
            .arg(group)
            .arg("$")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.to_string().contains("BUSYGROUP") => Ok(()),
            Err(e) => Err(Error::from(e)),
        }
    }

    async fn append(&self, stream: &str, payload: &[u8]) -> Result<String> {
        let mut conn = self.conn.clone();
        let id: String = redis::cmd("XADD")
            .arg(stream)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.stream_maxlen)
            .arg("*")
            .arg("payload")
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(id)
    }

    async fn read_group(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
    ) -> Result<Vec<(String, Vec<u8>)>> {
        let mut conn = self.conn.clone();
        let reply: redis::streams::StreamReadReply = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(group)
            .arg(consumer)
            .arg("COUNT")
            .arg(count)
            .arg("STREAMS")
            .arg(stream)
            .arg(">")
            .query_async(&mut conn)
            .await?;

        let mut out = Vec::new();
        for key in reply.keys {
            for id in key.ids {
                if let Some(value) = id.map.get("payload") {
                    if let redis::Value::BulkString(bytes) = value {
                        out.push((id.id.clone(), bytes.clone()));
                    }
                }
            }
        }
        Ok(out)
    }

    async fn ack(&self, stream: &str, group: &str, id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.xack(stream, group, &[id]).await?;
        Ok(())
    }
}

#[async_trait]
impl Broadcaster for RedisStore {
    async fn publish_batch_notice(&self, venue_slug: &str, count: usize) -> Result<()> {
        let mut conn = self.conn.clone();
        let message = json!({"type": "odds_batch", "venue": venue_slug, "count": count}).to_string();
        let _: () = conn.publish(BATCH_NOTICE_CHANNEL, message).await?;
        Ok(())
    }

    async fn publish_alert(&self, opportunity: &Opportunity) -> Result<()> {
        let mut conn = self.conn.clone();
        let message = json!({"type": "arb_alert", "data": opportunity}).to_string();
        let _: () = conn.publish(ALERT_CHANNEL, message).await?;
        Ok(())
    }
}

#[async_trait]
impl OpportunityStore for RedisStore {
    async fn upsert(&self, opportunity: &Opportunity, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .zadd(OPPORTUNITIES_ZSET, &opportunity.id, opportunity.expected_profit)
            .await?;

        let data_key = opportunity_data_key(&opportunity.id);
        let json = serde_json::to_string(opportunity)?;
        let _: () = conn.hset(&data_key, "json", json).await?;
        let _: () = conn.expire(&data_key, ttl.as_secs() as i64).await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.zrem(OPPORTUNITIES_ZSET, id).await?;
        let _: () = conn.del(opportunity_data_key(id)).await?;
        Ok(())
    }

    async fn top(&self, limit: usize) -> Result<Vec<Opportunity>> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn
            .zrevrange(OPPORTUNITIES_ZSET, 0, limit.saturating_sub(1) as isize)
            .await?;

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let json: Option<String> = conn.hget(opportunity_data_key(&id), "json").await?;
            if let Some(json) = json {
                out.push(serde_json::from_str(&json)?);
            } else {
                // data expired/evicted after the zset entry was written;
                // drop the stale ranking entry rather than surface a hole.
                let _: () = conn.zrem(OPPORTUNITIES_ZSET, &id).await?;
            }
        }
        Ok(out)
    }
}

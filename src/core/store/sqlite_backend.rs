//! SQLite-backed [`DurableStore`], written by the snapshotter and pruned by
//! the pruner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::db::model::{NewOddsSnapshotRow, OddsSnapshotRow};
use super::db::schema::odds_snapshots;
use super::db::DbPool;
use super::DurableStore;
use crate::core::domain::OddsSnapshot;
use crate::error::{Error, Result};

pub struct SqliteDurableStore {
    pool: DbPool,
}

impl SqliteDurableStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn to_row(snapshot: &OddsSnapshot) -> NewOddsSnapshotRow {
        NewOddsSnapshotRow {
            market_id: snapshot.market_id.clone(),
            venue_slug: snapshot.venue_slug.clone(),
            outcome_index: snapshot.outcome_index as i32,
            outcome_name: snapshot.outcome_name.clone(),
            price: snapshot.price,
            implied_prob: snapshot.implied_prob,
            captured_at: snapshot.captured_at.to_rfc3339(),
        }
    }
}

#[async_trait]
impl DurableStore for SqliteDurableStore {
    async fn insert_snapshots(&self, snapshots: &[OddsSnapshot]) -> Result<usize> {
        if snapshots.is_empty() {
            return Ok(0);
        }
        let rows: Vec<NewOddsSnapshotRow> = snapshots.iter().map(Self::to_row).collect();
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        let inserted = diesel::insert_into(odds_snapshots::table)
            .values(&rows)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(inserted)
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        let cutoff = cutoff.to_rfc3339();
        let deleted = diesel::delete(odds_snapshots::table.filter(odds_snapshots::captured_at.lt(cutoff)))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(deleted)
    }

    async fn count(&self) -> Result<i64> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        let rows: Vec<OddsSnapshotRow> = odds_snapshots::table
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.len() as i64)
    }
}

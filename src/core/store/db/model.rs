//! Diesel row types for the durable history table.

use diesel::prelude::*;

use super::schema::odds_snapshots;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = odds_snapshots)]
pub struct NewOddsSnapshotRow {
    pub market_id: String,
    pub venue_slug: String,
    pub outcome_index: i32,
    pub outcome_name: String,
    pub price: f64,
    pub implied_prob: f64,
    pub captured_at: String,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = odds_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OddsSnapshotRow {
    pub id: i32,
    pub market_id: String,
    pub venue_slug: String,
    pub outcome_index: i32,
    pub outcome_name: String,
    pub price: f64,
    pub implied_prob: f64,
    pub captured_at: String,
}

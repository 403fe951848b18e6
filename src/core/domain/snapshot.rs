//! Durable history row, written by the snapshotter and read by the pruner
//! and any historical-query path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsSnapshot {
    pub market_id: String,
    pub venue_slug: String,
    pub outcome_index: u32,
    pub outcome_name: String,
    pub price: f64,
    pub implied_prob: f64,
    pub captured_at: DateTime<Utc>,
}

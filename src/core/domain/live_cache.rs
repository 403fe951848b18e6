//! The aggregated per-venue-market live cache row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::Category;
use super::quote::{NormalisedQuote, OutcomeKind};

/// One outcome's fields within a [`LiveCacheEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSnapshot {
    pub index: u32,
    pub name: String,
    pub price: f64,
    pub implied_prob: f64,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub kind: OutcomeKind,
}

/// Keyed by `(venue_slug, external_market_id)`. Aggregates all outcomes of
/// one venue-market reported by the most recent successful publish batch
/// for that key — never a torn mix of outcome-N from one batch alongside
/// stale outcome-M from an earlier, differently-sized batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveCacheEntry {
    pub venue_slug: String,
    pub external_market_id: String,
    pub title: String,
    pub category: Category,
    pub url: Option<String>,
    pub volume_24h: Option<f64>,
    pub volume_usd: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub updated_at: DateTime<Utc>,
    pub outcomes: Vec<OutcomeSnapshot>,
}

impl LiveCacheEntry {
    /// Build a fresh entry from one publish batch of normalised quotes that
    /// all share the same `(venue_slug, external_market_id)`. Returns
    /// `None` for an empty batch.
    ///
    /// Building a brand-new entry, rather than patching fields in place,
    /// means every publish of a key fully replaces its previous cache
    /// entry, so a reader never observes outcome fields from two
    /// differently-sized batches.
    #[must_use]
    pub fn from_batch(quotes: &[NormalisedQuote]) -> Option<Self> {
        let first = quotes.first()?;
        let mut outcomes: Vec<OutcomeSnapshot> = quotes
            .iter()
            .map(|q| OutcomeSnapshot {
                index: q.outcome_index,
                name: q.outcome_name.clone(),
                price: q.price,
                implied_prob: q.implied_prob,
                bid: q.bid,
                ask: q.ask,
                kind: q.outcome_kind(),
            })
            .collect();
        outcomes.sort_by_key(|o| o.index);

        let updated_at = quotes.iter().map(|q| q.captured_at).max()?;

        Some(Self {
            venue_slug: first.venue_slug.clone(),
            external_market_id: first.external_market_id.clone(),
            title: first.market_title.clone(),
            category: first.category,
            url: first.market_url.clone(),
            volume_24h: first.volume_24h,
            volume_usd: first.volume_usd,
            liquidity_usd: first.liquidity_usd,
            updated_at,
            outcomes,
        })
    }

    #[must_use]
    pub fn outcome_by_name(&self, name: &str) -> Option<&OutcomeSnapshot> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(outcome_index: u32, outcome_name: &str) -> NormalisedQuote {
        NormalisedQuote {
            venue_slug: "kalshi".into(),
            external_market_id: "KXFED".into(),
            market_title: "Will the Fed cut rates?".into(),
            category: Category::Economics,
            outcome_index,
            outcome_name: outcome_name.into(),
            price: 0.4,
            implied_prob: 0.4,
            bid: None,
            ask: None,
            volume_24h: None,
            volume_usd: None,
            liquidity_usd: None,
            market_url: None,
            description: None,
            end_date: None,
            outcomes_json: vec![],
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn from_batch_aggregates_all_outcomes() {
        let batch = vec![quote(0, "Yes"), quote(1, "No")];
        let entry = LiveCacheEntry::from_batch(&batch).unwrap();
        assert_eq!(entry.outcomes.len(), 2);
        assert_eq!(entry.venue_slug, "kalshi");
        assert!(entry.outcome_by_name("Yes").is_some());
    }

    #[test]
    fn from_batch_empty_is_none() {
        assert!(LiveCacheEntry::from_batch(&[]).is_none());
    }

    #[test]
    fn from_batch_sorts_outcomes_by_index() {
        let batch = vec![quote(1, "No"), quote(0, "Yes")];
        let entry = LiveCacheEntry::from_batch(&batch).unwrap();
        assert_eq!(entry.outcomes[0].name, "Yes");
        assert_eq!(entry.outcomes[1].name, "No");
    }

    #[test]
    fn from_batch_shrinking_outcome_set_yields_a_fresh_consistent_entry() {
        // A 3-outcome batch followed by a 2-outcome batch for the same key:
        // from_batch never mixes fields across calls, so a reader always
        // sees a self-consistent outcome set.
        let first = vec![quote(0, "Red"), quote(1, "Blue"), quote(2, "Green")];
        let second = vec![quote(0, "Red"), quote(1, "Blue")];

        let entry_one = LiveCacheEntry::from_batch(&first).unwrap();
        let entry_two = LiveCacheEntry::from_batch(&second).unwrap();

        assert_eq!(entry_one.outcomes.len(), 3);
        assert_eq!(entry_two.outcomes.len(), 2);
        assert!(entry_two.outcome_by_name("Green").is_none());
    }
}

//! Detected cross-venue arbitrage opportunities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::Category;

/// One leg of an [`Opportunity`]: the best-priced quote for a single
/// outcome at a single venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityLeg {
    pub venue_slug: String,
    pub external_market_id: String,
    pub outcome_name: String,
    pub price: f64,
    pub implied_prob: f64,
    pub suggested_stake: f64,
}

/// A detected arbitrage opportunity. Derived by the engine's detection
/// subtask, not persisted beyond the opportunity store's short expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub canonical_title: String,
    pub category: Category,
    pub total_implied: f64,
    pub expected_profit: f64,
    pub legs: Vec<OpportunityLeg>,
    pub detected_at: DateTime<Utc>,
}

impl Opportunity {
    /// True when every leg references a distinct venue.
    #[must_use]
    pub fn legs_have_distinct_venues(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.legs.iter().all(|leg| seen.insert(&leg.venue_slug))
    }

    /// True when `expected_profit` equals `1 - sum(implied_prob over legs)`.
    #[must_use]
    pub fn profit_is_consistent(&self, epsilon: f64) -> bool {
        let sum: f64 = self.legs.iter().map(|leg| leg.implied_prob).sum();
        ((1.0 - sum) - self.expected_profit).abs() < epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(venue: &str, implied_prob: f64) -> OpportunityLeg {
        OpportunityLeg {
            venue_slug: venue.into(),
            external_market_id: "m".into(),
            outcome_name: "Yes".into(),
            price: implied_prob,
            implied_prob,
            suggested_stake: 0.0,
        }
    }

    fn opp(legs: Vec<OpportunityLeg>) -> Opportunity {
        let total: f64 = legs.iter().map(|l| l.implied_prob).sum();
        Opportunity {
            id: "abc123".into(),
            canonical_title: "Will it rain?".into(),
            category: Category::Science,
            total_implied: total,
            expected_profit: 1.0 - total,
            legs,
            detected_at: Utc::now(),
        }
    }

    #[test]
    fn distinct_venues_holds_for_normal_opportunity() {
        let o = opp(vec![leg("polymarket", 0.47), leg("kalshi", 0.48)]);
        assert!(o.legs_have_distinct_venues());
    }

    #[test]
    fn distinct_venues_fails_for_duplicate_venue() {
        let o = opp(vec![leg("polymarket", 0.47), leg("polymarket", 0.48)]);
        assert!(!o.legs_have_distinct_venues());
    }

    #[test]
    fn profit_consistency_holds() {
        let o = opp(vec![leg("polymarket", 0.47), leg("kalshi", 0.48)]);
        assert!(o.profit_is_consistent(1e-9));
    }
}

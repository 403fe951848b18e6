//! Raw and normalised quote records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::Category;

/// The venue-native encoding of a price, as declared by the worker that
/// extracted it. `normalise::normalise_price` maps every variant to implied
/// probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceFormat {
    Probability,
    Cents,
    AmericanPositive,
    AmericanNegative,
    Decimal,
    /// Anything a worker can't classify. Treated as `Probability` by the
    /// normaliser.
    Unknown,
}

/// Binary-outcome classification, used for the `type` field of a live cache
/// outcome row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Yes,
    No,
    Other,
}

impl OutcomeKind {
    /// Classify an outcome name case-insensitively against the binary
    /// `Yes`/`No` convention shared by every venue in this pipeline.
    #[must_use]
    pub fn classify(outcome_name: &str) -> Self {
        if outcome_name.eq_ignore_ascii_case("yes") {
            Self::Yes
        } else if outcome_name.eq_ignore_ascii_case("no") {
            Self::No
        } else {
            Self::Other
        }
    }
}

/// One entry of a market's full outcome list, as reported by the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRef {
    pub name: String,
    pub index: u32,
}

/// A raw quote as extracted by a worker, before normalisation.
///
/// RawQuotes are ephemeral: a worker produces a batch, the normaliser
/// consumes it in the same task, and only the resulting `NormalisedQuote`s
/// are published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuote {
    pub venue_slug: String,
    pub external_market_id: String,
    pub market_title: String,
    pub category: Category,
    pub outcome_index: u32,
    pub outcome_name: String,
    pub price: f64,
    pub price_format: PriceFormat,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub volume_24h: Option<f64>,
    pub volume_usd: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub market_url: Option<String>,
    pub description: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub outcomes_json: Vec<OutcomeRef>,
    pub captured_at: DateTime<Utc>,
}

/// A `RawQuote` plus implied probability. Retains `price` verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalisedQuote {
    pub venue_slug: String,
    pub external_market_id: String,
    pub market_title: String,
    pub category: Category,
    pub outcome_index: u32,
    pub outcome_name: String,
    pub price: f64,
    pub implied_prob: f64,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub volume_24h: Option<f64>,
    pub volume_usd: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub market_url: Option<String>,
    pub description: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub outcomes_json: Vec<OutcomeRef>,
    pub captured_at: DateTime<Utc>,
}

impl NormalisedQuote {
    /// `implied_prob` must be strictly between 0 and 1 for an admitted
    /// quote. Quotes at the boundary are rejected.
    #[must_use]
    pub fn is_admissible(&self) -> bool {
        self.implied_prob > 0.0 && self.implied_prob < 1.0
    }

    #[must_use]
    pub fn outcome_kind(&self) -> OutcomeKind {
        OutcomeKind::classify(&self.outcome_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(implied_prob: f64) -> NormalisedQuote {
        NormalisedQuote {
            venue_slug: "polymarket".into(),
            external_market_id: "m1".into(),
            market_title: "Will it rain?".into(),
            category: Category::Science,
            outcome_index: 0,
            outcome_name: "Yes".into(),
            price: 0.5,
            implied_prob,
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
    fn admissible_strictly_between_zero_and_one() {
        assert!(quote(0.5).is_admissible());
        assert!(!quote(0.0).is_admissible());
        assert!(!quote(1.0).is_admissible());
    }

    #[test]
    fn outcome_kind_classification_is_case_insensitive() {
        let mut q = quote(0.5);
        q.outcome_name = "YES".into();
        assert_eq!(q.outcome_kind(), OutcomeKind::Yes);
        q.outcome_name = "no".into();
        assert_eq!(q.outcome_kind(), OutcomeKind::No);
        q.outcome_name = "Maybe".into();
        assert_eq!(q.outcome_kind(), OutcomeKind::Other);
    }
}

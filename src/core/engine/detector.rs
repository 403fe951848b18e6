//! Pure arbitrage detection over a canonical title's buffered best-per-outcome
//! quotes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::core::domain::{Category, NormalisedQuote, Opportunity, OpportunityLeg};

use super::stake::size_stakes;

/// A stake budget to size a freshly detected opportunity's legs against.
/// Informational — a leg's `suggested_stake` is advisory, not an order
/// instruction.
pub const DEFAULT_STAKE_BUDGET: f64 = 100.0;

/// Given the best (lowest-`implied_prob`) quote seen for each distinct
/// outcome name of one canonical title, detect whether the set of legs
/// forms an arbitrage: `sum(implied_prob) < 1`.
///
/// Returns `None` when fewer than two outcomes are covered, when two or
/// more legs share a venue (no cross-venue arbitrage exists if one venue
/// already offers the cheapest price on every outcome), or when the sum of
/// implied probabilities is not strictly less than one.
#[must_use]
pub fn detect_arbitrage(
    canonical_title: &str,
    category: Category,
    legs: &HashMap<String, NormalisedQuote>,
    now: DateTime<Utc>,
) -> Option<Opportunity> {
    if legs.len() < 2 {
        return None;
    }

    let mut venues = std::collections::HashSet::new();
    if !legs.values().all(|q| venues.insert(q.venue_slug.clone())) {
        return None;
    }

    let total_implied: f64 = legs.values().map(|q| q.implied_prob).sum();
    if total_implied >= 1.0 {
        return None;
    }

    let mut ordered: Vec<&NormalisedQuote> = legs.values().collect();
    ordered.sort_by(|a, b| a.outcome_name.cmp(&b.outcome_name));

    let implied_probs: Vec<f64> = ordered.iter().map(|q| q.implied_prob).collect();
    let stakes = size_stakes(&implied_probs, DEFAULT_STAKE_BUDGET);

    let legs: Vec<OpportunityLeg> = ordered
        .into_iter()
        .zip(stakes)
        .map(|(q, suggested_stake)| OpportunityLeg {
            venue_slug: q.venue_slug.clone(),
            external_market_id: q.external_market_id.clone(),
            outcome_name: q.outcome_name.clone(),
            price: q.price,
            implied_prob: q.implied_prob,
            suggested_stake,
        })
        .collect();

    Some(Opportunity {
        id: opportunity_id(canonical_title, &legs),
        canonical_title: canonical_title.to_string(),
        category,
        total_implied,
        expected_profit: 1.0 - total_implied,
        legs,
        detected_at: now,
    })
}

/// Deterministic id: the same set of legs for the same title always
/// produces the same id, so re-detecting an unchanged opportunity upserts
/// rather than duplicates.
fn opportunity_id(canonical_title: &str, legs: &[OpportunityLeg]) -> String {
    use std::fmt::Write as _;
    let mut key = canonical_title.to_string();
    for leg in legs {
        let _ = write!(key, "|{}:{}", leg.venue_slug, leg.outcome_name);
    }
    format!("{:016x}", fnv1a(key.as_bytes()))
}

/// Small, dependency-free FNV-1a hash — only used to derive a stable
/// opportunity id string, not for anything security-sensitive.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

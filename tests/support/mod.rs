//! Shared builders for the integration test suite. Every helper here mirrors
//! a real worker's output shape rather than reaching into crate internals —
//! these tests exercise the pipeline the way a worker, the engine, and the
//! query layer actually do.

use chrono::Utc;
use oddsaxiom::core::domain::{Category, NormalisedQuote, PriceFormat, RawQuote};
use oddsaxiom::core::normalise::normalise;

/// Build a `RawQuote` with sane defaults, overriding only what a test cares
/// about.
#[allow(dead_code)]
pub fn raw_quote(
    venue_slug: &str,
    market_id: &str,
    market_title: &str,
    outcome_index: u32,
    outcome_name: &str,
    price: f64,
    price_format: PriceFormat,
) -> RawQuote {
    RawQuote {
        venue_slug: venue_slug.to_string(),
        external_market_id: market_id.to_string(),
        market_title: market_title.to_string(),
        category: Category::Politics,
        outcome_index,
        outcome_name: outcome_name.to_string(),
        price,
        price_format,
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

/// A ready-to-publish `NormalisedQuote`, skipping the `normalise()` step for
/// tests that only care about the post-normalisation shape.
#[allow(dead_code)]
pub fn quote(
    venue_slug: &str,
    market_id: &str,
    market_title: &str,
    category: Category,
    outcome_name: &str,
    implied_prob: f64,
) -> NormalisedQuote {
    let raw = RawQuote {
        venue_slug: venue_slug.to_string(),
        external_market_id: market_id.to_string(),
        market_title: market_title.to_string(),
        category,
        outcome_index: 0,
        outcome_name: outcome_name.to_string(),
        price: implied_prob,
        price_format: PriceFormat::Probability,
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
    };
    normalise(&raw)
}

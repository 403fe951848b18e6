//! Price-format -> implied probability.
//!
//! Pure, deterministic, no I/O. Applied to every `RawQuote` before
//! publishing. Rejection of admissible-range violations (`implied_prob`
//! exactly 0 or 1) is enforced downstream — by the publisher/engine
//! boundary, not here — so this module never returns an error; it only
//! computes.

use crate::core::domain::{NormalisedQuote, PriceFormat, RawQuote};

/// Convert a single raw price to implied probability:
///
/// | format             | rule                                  |
/// |--------------------|----------------------------------------|
/// | probability        | clamp to `[0, 1]`                      |
/// | cents              | `p / 100`, clamp                       |
/// | american_positive  | `100 / (p + 100)` for `p > 0`, else 0.5 |
/// | american_negative   | `|p| / (|p| + 100)` for `p != 0`, else 0.5 |
/// | decimal            | `1 / p` for `p > 0`, else 0            |
/// | unknown            | treat as probability                   |
#[must_use]
pub fn normalise_price(price: f64, format: PriceFormat) -> f64 {
    match format {
        PriceFormat::Probability | PriceFormat::Unknown => price.clamp(0.0, 1.0),
        PriceFormat::Cents => (price / 100.0).clamp(0.0, 1.0),
        PriceFormat::AmericanPositive => {
            if price > 0.0 {
                100.0 / (price + 100.0)
            } else {
                0.5
            }
        }
        PriceFormat::AmericanNegative => {
            let abs_price = price.abs();
            if abs_price != 0.0 {
                abs_price / (abs_price + 100.0)
            } else {
                0.5
            }
        }
        PriceFormat::Decimal => {
            if price > 0.0 {
                1.0 / price
            } else {
                0.0
            }
        }
    }
}

/// Normalise one raw quote into its normalised counterpart.
#[must_use]
pub fn normalise(raw: &RawQuote) -> NormalisedQuote {
    NormalisedQuote {
        venue_slug: raw.venue_slug.clone(),
        external_market_id: raw.external_market_id.clone(),
        market_title: raw.market_title.clone(),
        category: raw.category,
        outcome_index: raw.outcome_index,
        outcome_name: raw.outcome_name.clone(),
        price: raw.price,
        implied_prob: normalise_price(raw.price, raw.price_format),
        bid: raw.bid,
        ask: raw.ask,
        volume_24h: raw.volume_24h,
        volume_usd: raw.volume_usd,
        liquidity_usd: raw.liquidity_usd,
        market_url: raw.market_url.clone(),
        description: raw.description.clone(),
        end_date: raw.end_date,
        outcomes_json: raw.outcomes_json.clone(),
        captured_at: raw.captured_at,
    }
}

/// Normalise a batch of raw quotes emitted by one worker tick.
#[must_use]
pub fn normalise_batch(raw: &[RawQuote]) -> Vec<NormalisedQuote> {
    raw.iter().map(normalise).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::Category;
    use chrono::Utc;

    fn raw(price: f64, format: PriceFormat) -> RawQuote {
        RawQuote {
            venue_slug: "test".into(),
            external_market_id: "m1".into(),
            market_title: "title".into(),
            category: Category::Politics,
            outcome_index: 0,
            outcome_name: "Yes".into(),
            price,
            price_format: format,
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
    fn probability_clamps() {
        assert_eq!(normalise_price(0.47, PriceFormat::Probability), 0.47);
        assert_eq!(normalise_price(1.5, PriceFormat::Probability), 1.0);
        assert_eq!(normalise_price(-0.2, PriceFormat::Probability), 0.0);
    }

    #[test]
    fn cents_divides_by_hundred() {
        assert_eq!(normalise_price(47.0, PriceFormat::Cents), 0.47);
        assert_eq!(normalise_price(52.0, PriceFormat::Cents), 0.52);
    }

    #[test]
    fn american_positive_matches_reference_values() {
        let implied = normalise_price(150.0, PriceFormat::AmericanPositive);
        assert!((implied - 0.4).abs() < 1e-9);
    }

    #[test]
    fn american_negative_matches_reference_values() {
        let implied = normalise_price(-200.0, PriceFormat::AmericanNegative);
        assert!((implied - 0.6666666667).abs() < 1e-6);
    }

    #[test]
    fn american_positive_non_positive_defaults_to_half() {
        assert_eq!(normalise_price(0.0, PriceFormat::AmericanPositive), 0.5);
        assert_eq!(normalise_price(-5.0, PriceFormat::AmericanPositive), 0.5);
    }

    #[test]
    fn american_negative_zero_defaults_to_half() {
        assert_eq!(normalise_price(0.0, PriceFormat::AmericanNegative), 0.5);
    }

    #[test]
    fn decimal_inverts() {
        let implied = normalise_price(2.5, PriceFormat::Decimal);
        assert_eq!(implied, 0.4);
    }

    #[test]
    fn decimal_non_positive_is_zero() {
        assert_eq!(normalise_price(0.0, PriceFormat::Decimal), 0.0);
        assert_eq!(normalise_price(-1.0, PriceFormat::Decimal), 0.0);
    }

    #[test]
    fn unknown_format_treated_as_probability() {
        assert_eq!(normalise_price(0.6, PriceFormat::Unknown), 0.6);
    }

    #[test]
    fn normalise_preserves_price_verbatim() {
        let q = normalise(&raw(47.0, PriceFormat::Cents));
        assert_eq!(q.price, 47.0);
        assert_eq!(q.implied_prob, 0.47);
    }

    #[test]
    fn normalise_is_idempotent_on_already_normalised_probability() {
        let once = normalise_price(0.37, PriceFormat::Probability);
        let twice = normalise_price(once, PriceFormat::Probability);
        assert_eq!(once, twice);
    }

    #[test]
    fn american_odds_round_trip_preserves_sign() {
        // +150 -> implied 0.4; converting back via p = 100*(1-implied)/implied
        // should recover +150, i.e. the same sign/magnitude domain.
        let implied = normalise_price(150.0, PriceFormat::AmericanPositive);
        let recovered = 100.0 * (1.0 - implied) / implied;
        assert!((recovered - 150.0).abs() < 1e-6);

        // -200 -> implied 0.6667; converting back via p = -100*implied/(1-implied)
        let implied_neg = normalise_price(-200.0, PriceFormat::AmericanNegative);
        let recovered_neg = -100.0 * implied_neg / (1.0 - implied_neg);
        assert!((recovered_neg - (-200.0)).abs() < 1e-4);
    }

    #[test]
    fn normalise_batch_preserves_order_and_length() {
        let batch = vec![
            raw(47.0, PriceFormat::Cents),
            raw(0.5, PriceFormat::Probability),
        ];
        let out = normalise_batch(&batch);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].implied_prob, 0.47);
        assert_eq!(out[1].implied_prob, 0.5);
    }
}

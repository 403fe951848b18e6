//! Polymarket venue adapter — Gamma API market discovery.
//!
//! Polymarket serialises `outcomes`/`outcomePrices` as JSON-encoded strings
//! inside each market object, so parsing stays on raw `serde_json::Value`
//! rather than a typed DTO: the shape is closer to the upstream worker's
//! dict-walking than to a fixed schema.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use crate::core::domain::{Category, OutcomeRef, PriceFormat, RawQuote};
use crate::core::workers::category_map::classify_by_keywords;
use crate::core::workers::Worker;
use crate::error::Result;

const GAMMA_API_BASE: &str = "https://gamma-api.polymarket.com";

const CATEGORY_KEYWORDS: &[(&str, Category)] = &[
    ("politics", Category::Politics),
    ("election", Category::Politics),
    ("trump", Category::Politics),
    ("biden", Category::Politics),
    ("congress", Category::Politics),
    ("senate", Category::Politics),
    ("crypto", Category::Crypto),
    ("bitcoin", Category::Crypto),
    ("ethereum", Category::Crypto),
    ("sports", Category::Sports),
    ("nfl", Category::Sports),
    ("nba", Category::Sports),
    ("mlb", Category::Sports),
    ("soccer", Category::Sports),
    ("science", Category::Science),
    ("climate", Category::Science),
    ("ai", Category::Science),
    ("economy", Category::Economics),
    ("fed", Category::Economics),
    ("inflation", Category::Economics),
    ("gdp", Category::Economics),
    ("recession", Category::Economics),
    ("entertainment", Category::Culture),
    ("oscars", Category::Culture),
    ("culture", Category::Culture),
];

/// Classify an event by title and tags, falling back to politics — matches
/// Polymarket's own default, since the venue's catalogue skews political.
fn classify_category(title: &str, tags: &[Value]) -> Category {
    let tag_text: String = tags
        .iter()
        .map(|t| {
            t.as_str().map_or_else(
                || {
                    t.get("label")
                        .or_else(|| t.get("name"))
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                },
                str::to_string,
            )
        })
        .collect::<Vec<_>>()
        .join(" ");
    let search_text = format!("{title} {tag_text}");
    classify_by_keywords(&search_text, CATEGORY_KEYWORDS, Category::Politics)
}

/// Parse a market's `outcomes`/`outcomePrices` fields, which Polymarket
/// encodes as JSON strings rather than native arrays.
fn parse_json_string_array(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items.clone()),
        Value::String(s) if !s.is_empty() => serde_json::from_str::<Vec<Value>>(s).ok(),
        _ => None,
    }
}

pub struct PolymarketWorker {
    http: Client,
}

impl Default for PolymarketWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl PolymarketWorker {
    #[must_use]
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    async fn fetch_events(&self) -> Result<Vec<Value>> {
        let events: Vec<Value> = self
            .http
            .get(format!("{GAMMA_API_BASE}/events"))
            .query(&[("active", "true"), ("closed", "false"), ("limit", "100")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(events)
    }

    fn parse_event(event: &Value) -> Vec<RawQuote> {
        let event_title = event.get("title").and_then(Value::as_str).unwrap_or_default();
        let empty = Vec::new();
        let tags = event.get("tags").and_then(Value::as_array).unwrap_or(&empty);
        let category = classify_category(event_title, tags);
        let slug = event.get("slug").and_then(Value::as_str).unwrap_or_default();
        let captured_at = Utc::now();

        let mut quotes = Vec::new();
        for market in event.get("markets").and_then(Value::as_array).unwrap_or(&empty) {
            let market_id = market
                .get("conditionId")
                .or_else(|| market.get("id"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            if market_id.is_empty() {
                continue;
            }
            let question = market.get("question").and_then(Value::as_str).unwrap_or(event_title);

            let Some(prices) = market.get("outcomePrices").and_then(parse_json_string_array) else {
                continue;
            };
            let outcome_names = market
                .get("outcomes")
                .and_then(parse_json_string_array)
                .unwrap_or_else(|| vec![Value::String("Yes".into()), Value::String("No".into())]);

            let outcomes_json: Vec<OutcomeRef> = outcome_names
                .iter()
                .enumerate()
                .map(|(i, name)| OutcomeRef {
                    name: name.as_str().unwrap_or_default().to_string(),
                    index: i as u32,
                })
                .collect();

            for (i, (name, price_raw)) in outcome_names.iter().zip(prices.iter()).enumerate() {
                let Some(price) = price_raw
                    .as_str()
                    .and_then(|s| s.parse::<f64>().ok())
                    .or_else(|| price_raw.as_f64())
                else {
                    continue;
                };

                quotes.push(RawQuote {
                    venue_slug: "polymarket".into(),
                    external_market_id: market_id.to_string(),
                    market_title: question.to_string(),
                    category,
                    outcome_index: i as u32,
                    outcome_name: name.as_str().unwrap_or_default().to_string(),
                    price,
                    price_format: PriceFormat::Probability,
                    bid: None,
                    ask: None,
                    volume_24h: None,
                    volume_usd: market.get("volume").and_then(Value::as_f64),
                    liquidity_usd: market.get("liquidity").and_then(Value::as_f64),
                    market_url: Some(format!("https://polymarket.com/event/{slug}")),
                    description: market.get("description").and_then(Value::as_str).map(str::to_string),
                    end_date: None,
                    outcomes_json: outcomes_json.clone(),
                    captured_at,
                });
            }
        }
        quotes
    }
}

#[async_trait]
impl Worker for PolymarketWorker {
    fn venue_slug(&self) -> &str {
        "polymarket"
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(30)
    }

    async fn connect(&mut self) -> Result<()> {
        tracing::info!("connected to Polymarket Gamma API");
        Ok(())
    }

    async fn fetch_batch(&mut self) -> Result<Vec<RawQuote>> {
        let events = self.fetch_events().await?;
        Ok(events.iter().flat_map(Self::parse_event).collect())
    }

    async fn stop(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_category_matches_keyword_over_default() {
        assert_eq!(classify_category("Will the Fed cut rates?", &[]), Category::Economics);
    }

    #[test]
    fn classify_category_falls_back_to_politics() {
        assert_eq!(classify_category("Something unrelated", &[]), Category::Politics);
    }

    #[test]
    fn classify_category_considers_tags() {
        assert_eq!(classify_category("Untitled market", &[Value::String("crypto".into())]), Category::Crypto);
    }

    #[test]
    fn parse_json_string_array_decodes_encoded_string() {
        let value = Value::String(r#"["Yes", "No"]"#.into());
        let parsed = parse_json_string_array(&value).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn parse_json_string_array_passes_through_native_array() {
        let value = Value::Array(vec![Value::String("Yes".into())]);
        let parsed = parse_json_string_array(&value).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn parse_event_builds_one_quote_per_outcome() {
        let event = serde_json::json!({
            "title": "Will it rain?",
            "slug": "will-it-rain",
            "tags": ["science"],
            "markets": [{
                "conditionId": "m1",
                "question": "Will it rain tomorrow?",
                "outcomes": "[\"Yes\", \"No\"]",
                "outcomePrices": "[\"0.4\", \"0.6\"]",
                "volume": 1000.0,
                "liquidity": 500.0,
            }]
        });
        let quotes = PolymarketWorker::parse_event(&event);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].category, Category::Science);
        assert_eq!(quotes[0].outcome_name, "Yes");
        assert_eq!(quotes[0].price, 0.4);
        assert_eq!(quotes[1].outcome_name, "No");
        assert_eq!(quotes[1].price, 0.6);
        assert_eq!(quotes[0].market_url.as_deref(), Some("https://polymarket.com/event/will-it-rain"));
    }
}

//! Limitless Exchange adapter.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use crate::core::domain::{Category, OutcomeRef, PriceFormat, RawQuote};
use crate::core::workers::category_map::infer_missing_side;
use crate::core::workers::Worker;
use crate::error::Result;

const MARKETS_URL: &str = "https://api.limitless.exchange/api-v1/markets";

fn classify(title: &str) -> Category {
    let t = title.to_lowercase();
    if ["bitcoin", "crypto", "ethereum", "btc", "eth", "solana"].iter().any(|k| t.contains(k)) {
        Category::Crypto
    } else if ["election", "president", "politics", "trump", "congress"].iter().any(|k| t.contains(k)) {
        Category::Politics
    } else if ["economy", "fed", "inflation", "gdp"].iter().any(|k| t.contains(k)) {
        Category::Economics
    } else if ["nfl", "nba", "sports"].iter().any(|k| t.contains(k)) {
        Category::Sports
    } else if ["climate", "science", "ai"].iter().any(|k| t.contains(k)) {
        Category::Science
    } else {
        Category::Culture
    }
}

pub struct LimitlessWorker {
    http: Client,
}

impl Default for LimitlessWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl LimitlessWorker {
    #[must_use]
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    fn parse_markets(markets: &[Value]) -> Vec<RawQuote> {
        let captured_at = Utc::now();
        let mut quotes = Vec::new();

        for market in markets {
            let market_id = market
                .get("id")
                .or_else(|| market.get("address"))
                .map_or_else(String::new, |v| v.to_string().trim_matches('"').to_string());
            let title = market.get("title").or_else(|| market.get("question")).and_then(Value::as_str).unwrap_or_default();
            let category = classify(title);
            let description = market.get("description").and_then(Value::as_str).map(str::to_string);
            let volume_usd = market.get("volume").or_else(|| market.get("volumeUsd")).and_then(Value::as_f64);
            let liquidity_usd = market.get("liquidity").and_then(Value::as_f64);

            let mut outcome_pairs: Vec<(String, f64)> = Vec::new();
            if let Some(outcomes) = market.get("outcomes").and_then(Value::as_array).filter(|a| !a.is_empty()) {
                for outcome in outcomes {
                    let name = outcome.get("name").and_then(Value::as_str).unwrap_or("Option").to_string();
                    let price = outcome.get("price").or_else(|| outcome.get("lastPrice")).and_then(Value::as_f64);
                    if let Some(price) = price {
                        outcome_pairs.push((name, price));
                    }
                }
            } else {
                let yes_price = market
                    .get("yes_price")
                    .or_else(|| market.get("lastYesPrice"))
                    .and_then(Value::as_f64);
                if let Some(yes_price) = yes_price {
                    let no_price = market
                        .get("no_price")
                        .or_else(|| market.get("lastNoPrice"))
                        .and_then(Value::as_f64)
                        .unwrap_or_else(|| infer_missing_side(yes_price, PriceFormat::Probability));
                    outcome_pairs.push(("Yes".into(), yes_price));
                    outcome_pairs.push(("No".into(), no_price));
                }
            }

            let outcomes_json: Vec<OutcomeRef> = outcome_pairs
                .iter()
                .enumerate()
                .map(|(i, (name, _))| OutcomeRef { name: name.clone(), index: i as u32 })
                .collect();

            for (i, (name, price)) in outcome_pairs.into_iter().enumerate() {
                quotes.push(RawQuote {
                    venue_slug: "limitless".into(),
                    external_market_id: market_id.clone(),
                    market_title: title.to_string(),
                    category,
                    outcome_index: i as u32,
                    outcome_name: name,
                    price,
                    price_format: PriceFormat::Probability,
                    bid: None,
                    ask: None,
                    volume_24h: None,
                    volume_usd,
                    liquidity_usd,
                    market_url: Some(format!("https://limitless.exchange/markets/{market_id}")),
                    description: description.clone(),
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
impl Worker for LimitlessWorker {
    fn venue_slug(&self) -> &str {
        "limitless"
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(30)
    }

    async fn connect(&mut self) -> Result<()> {
        tracing::info!("connected to Limitless Exchange API");
        Ok(())
    }

    async fn fetch_batch(&mut self) -> Result<Vec<RawQuote>> {
        let response = self.http.get(MARKETS_URL).query(&[("status", "active")]).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("Limitless API markets endpoint returned 404");
            return Ok(Vec::new());
        }

        let body: Value = response.error_for_status()?.json().await?;
        let markets: Vec<Value> = match body {
            Value::Array(items) => items,
            Value::Object(_) => body
                .get("markets")
                .or_else(|| body.get("data"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        Ok(Self::parse_markets(&markets))
    }

    async fn stop(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_detects_politics() {
        assert_eq!(classify("Will Trump win the primary?"), Category::Politics);
    }

    #[test]
    fn parse_markets_uses_explicit_outcomes_list() {
        let market = serde_json::json!({
            "id": "m1",
            "title": "Will Solana flip Ethereum?",
            "outcomes": [
                {"name": "Yes", "price": 0.1},
                {"name": "No", "price": 0.9},
            ]
        });
        let quotes = LimitlessWorker::parse_markets(&[market]);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].category, Category::Crypto);
    }

    #[test]
    fn parse_markets_falls_back_to_binary_yes_no_fields() {
        let market = serde_json::json!({"id": "m2", "title": "Will it happen?", "yes_price": 0.3});
        let quotes = LimitlessWorker::parse_markets(&[market]);
        assert_eq!(quotes.len(), 2);
        assert!((quotes[1].price - 0.7).abs() < 1e-9);
    }

    #[test]
    fn parse_markets_skips_markets_with_no_outcomes_at_all() {
        let market = serde_json::json!({"id": "m3", "title": "Nothing here"});
        assert!(LimitlessWorker::parse_markets(&[market]).is_empty());
    }
}

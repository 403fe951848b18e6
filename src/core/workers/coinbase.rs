//! Coinbase prediction-markets adapter.
//!
//! Coinbase's prediction-market offering runs through a Kalshi partnership
//! and, as of writing, exposes no documented public discovery endpoint. This
//! worker probes the brokerage endpoint each tick and degrades to an empty
//! batch (not an error) on a 404, since that is the expected steady state
//! rather than a fault.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use crate::core::domain::{Category, OutcomeRef, PriceFormat, RawQuote};
use crate::core::workers::Worker;
use crate::error::Result;

const EVENTS_URL: &str = "https://api.coinbase.com/api/v3/brokerage/prediction-markets/events";

fn classify(title: &str) -> Category {
    let t = title.to_lowercase();
    if ["bitcoin", "crypto", "ethereum", "btc"].iter().any(|k| t.contains(k)) {
        Category::Crypto
    } else if ["election", "president", "politics"].iter().any(|k| t.contains(k)) {
        Category::Politics
    } else if ["economy", "fed", "inflation"].iter().any(|k| t.contains(k)) {
        Category::Economics
    } else if ["nfl", "nba", "sports"].iter().any(|k| t.contains(k)) {
        Category::Sports
    } else {
        Category::Culture
    }
}

pub struct CoinbaseWorker {
    http: Client,
    api_key: Option<String>,
}

impl CoinbaseWorker {
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self { http: Client::new(), api_key }
    }

    fn parse_events(events: &[Value]) -> Vec<RawQuote> {
        let captured_at = Utc::now();
        let empty = Vec::new();
        let mut quotes = Vec::new();

        for event in events {
            let event_id = event.get("id").map_or_else(String::new, |v| v.to_string().trim_matches('"').to_string());
            let title = event
                .get("title")
                .or_else(|| event.get("name"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            let category = classify(title);

            let contracts = event
                .get("contracts")
                .or_else(|| event.get("markets"))
                .and_then(Value::as_array)
                .unwrap_or(&empty);
            let outcomes_json: Vec<OutcomeRef> = contracts
                .iter()
                .enumerate()
                .map(|(i, c)| OutcomeRef { name: c.get("name").and_then(Value::as_str).unwrap_or_default().to_string(), index: i as u32 })
                .collect();

            for (i, contract) in contracts.iter().enumerate() {
                let name = contract.get("name").and_then(Value::as_str).unwrap_or("Option");
                let Some(price) = contract.get("price").or_else(|| contract.get("yes_price")).and_then(Value::as_f64) else { continue };

                quotes.push(RawQuote {
                    venue_slug: "coinbase".into(),
                    external_market_id: event_id.clone(),
                    market_title: title.to_string(),
                    category,
                    outcome_index: i as u32,
                    outcome_name: name.to_string(),
                    price,
                    price_format: PriceFormat::Probability,
                    bid: None,
                    ask: None,
                    volume_24h: None,
                    volume_usd: contract.get("volume").and_then(Value::as_f64),
                    liquidity_usd: None,
                    market_url: Some(format!("https://www.coinbase.com/prediction-markets/{event_id}")),
                    description: None,
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
impl Worker for CoinbaseWorker {
    fn venue_slug(&self) -> &str {
        "coinbase"
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(60)
    }

    async fn connect(&mut self) -> Result<()> {
        tracing::info!("connected to Coinbase API");
        Ok(())
    }

    async fn fetch_batch(&mut self) -> Result<Vec<RawQuote>> {
        let mut request = self.http.get(EVENTS_URL);
        if let Some(key) = &self.api_key {
            request = request.header("CB-ACCESS-KEY", key);
        }
        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("Coinbase prediction markets endpoint not available — data may flow through Kalshi partnership");
            return Ok(Vec::new());
        }
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!("Coinbase API: authentication required");
            return Ok(Vec::new());
        }

        let body: Value = response.error_for_status()?.json().await?;
        let events = body.get("events").or_else(|| body.get("data")).and_then(Value::as_array).cloned().unwrap_or_default();
        Ok(Self::parse_events(&events))
    }

    async fn stop(&mut self) {}
}

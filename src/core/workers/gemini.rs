//! Gemini prediction-markets adapter.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use crate::core::domain::{Category, OutcomeRef, PriceFormat, RawQuote};
use crate::core::workers::Worker;
use crate::error::Result;

const EVENTS_URL: &str = "https://api.gemini.com/v1/prediction-markets/events";

fn classify(title: &str) -> Category {
    let t = title.to_lowercase();
    if ["bitcoin", "crypto", "ethereum", "btc", "eth"].iter().any(|k| t.contains(k)) {
        Category::Crypto
    } else if ["election", "president", "congress", "trump", "politics"].iter().any(|k| t.contains(k)) {
        Category::Politics
    } else if ["economy", "fed", "inflation", "gdp", "rates"].iter().any(|k| t.contains(k)) {
        Category::Economics
    } else if ["nfl", "nba", "sports", "mlb", "soccer"].iter().any(|k| t.contains(k)) {
        Category::Sports
    } else if ["climate", "science", "ai", "temperature"].iter().any(|k| t.contains(k)) {
        Category::Science
    } else {
        Category::Culture
    }
}

pub struct GeminiWorker {
    http: Client,
    api_key: Option<String>,
}

impl GeminiWorker {
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
            let title = event.get("title").or_else(|| event.get("name")).and_then(Value::as_str).unwrap_or_default();
            let category = classify(title);

            let markets = event.get("markets").or_else(|| event.get("contracts")).and_then(Value::as_array).unwrap_or(&empty);
            let outcomes_json: Vec<OutcomeRef> = markets
                .iter()
                .enumerate()
                .map(|(i, m)| {
                    let name = m.get("name").or_else(|| m.get("outcome")).and_then(Value::as_str).unwrap_or_default().to_string();
                    OutcomeRef { name, index: i as u32 }
                })
                .collect();

            for (i, market) in markets.iter().enumerate() {
                let name = market.get("name").or_else(|| market.get("outcome")).and_then(Value::as_str).unwrap_or("Option");
                let Some(price) = market.get("price").or_else(|| market.get("last_price")).and_then(Value::as_f64) else { continue };

                quotes.push(RawQuote {
                    venue_slug: "gemini".into(),
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
                    volume_usd: market.get("volume").and_then(Value::as_f64),
                    liquidity_usd: None,
                    market_url: Some(format!("https://www.gemini.com/prediction-markets/{event_id}")),
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
impl Worker for GeminiWorker {
    fn venue_slug(&self) -> &str {
        "gemini"
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(30)
    }

    async fn connect(&mut self) -> Result<()> {
        tracing::info!("connected to Gemini Prediction Markets API");
        Ok(())
    }

    async fn fetch_batch(&mut self) -> Result<Vec<RawQuote>> {
        let mut request = self.http.get(EVENTS_URL);
        if let Some(key) = &self.api_key {
            request = request.header("X-GEMINI-APIKEY", key);
        }
        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("Gemini prediction markets endpoint not available yet");
            return Ok(Vec::new());
        }

        let events: Vec<Value> = response.error_for_status()?.json().await?;
        Ok(Self::parse_events(&events))
    }

    async fn stop(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_detects_science() {
        assert_eq!(classify("Will a major hurricane hit Florida?"), Category::Science);
    }

    #[test]
    fn classify_default_is_culture() {
        assert_eq!(classify("Random entertainment news"), Category::Culture);
    }

    #[test]
    fn parse_events_builds_quotes_from_markets_field() {
        let event = serde_json::json!({
            "id": "g1",
            "title": "Will the Fed cut rates in Q1?",
            "markets": [
                {"name": "Yes", "price": 0.55},
                {"name": "No", "price": 0.45},
            ]
        });
        let quotes = GeminiWorker::parse_events(&[event]);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].category, Category::Economics);
    }
}

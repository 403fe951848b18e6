//! Robinhood adapter — EXPERIMENTAL.
//!
//! Robinhood has no official public API for prediction markets; this worker
//! probes a known unofficial endpoint that may disappear without notice.
//! After [`MAX_CONSECUTIVE_FAILURES`] consecutive failures it stops
//! attempting requests until the process restarts, so a dead or rate-limited
//! endpoint degrades to silence rather than noisy repeated failures.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use crate::core::domain::{Category, OutcomeRef, PriceFormat, RawQuote};
use crate::core::workers::Worker;
use crate::error::Result;

const EVENTS_URL: &str = "https://bonfire-api.robinhood.com/prediction_markets/events/";
const MAX_CONSECUTIVE_FAILURES: u32 = 5;

fn classify(title: &str) -> Category {
    let t = title.to_lowercase();
    if ["election", "president", "politics", "trump"].iter().any(|k| t.contains(k)) {
        Category::Politics
    } else if ["bitcoin", "crypto"].iter().any(|k| t.contains(k)) {
        Category::Crypto
    } else if ["economy", "fed", "inflation"].iter().any(|k| t.contains(k)) {
        Category::Economics
    } else if ["nfl", "nba", "sports", "super bowl"].iter().any(|k| t.contains(k)) {
        Category::Sports
    } else if ["climate", "science"].iter().any(|k| t.contains(k)) {
        Category::Science
    } else {
        Category::Culture
    }
}

pub struct RobinhoodWorker {
    http: Client,
    consecutive_failures: u32,
}

impl Default for RobinhoodWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl RobinhoodWorker {
    #[must_use]
    pub fn new() -> Self {
        Self { http: Client::new(), consecutive_failures: 0 }
    }

    fn parse_events(events: &[Value]) -> Vec<RawQuote> {
        let captured_at = Utc::now();
        let empty = Vec::new();
        let mut quotes = Vec::new();

        for event in events {
            let event_id = event.get("id").map_or_else(String::new, |v| v.to_string().trim_matches('"').to_string());
            let title = event.get("title").or_else(|| event.get("name")).and_then(Value::as_str).unwrap_or_default();
            let category = classify(title);

            let contracts = event.get("contracts").or_else(|| event.get("markets")).and_then(Value::as_array).unwrap_or(&empty);
            let outcomes_json: Vec<OutcomeRef> = contracts
                .iter()
                .enumerate()
                .map(|(i, c)| OutcomeRef { name: c.get("name").and_then(Value::as_str).unwrap_or_default().to_string(), index: i as u32 })
                .collect();

            for (i, contract) in contracts.iter().enumerate() {
                let name = contract.get("name").and_then(Value::as_str).unwrap_or("Option");
                let price = contract
                    .get("price")
                    .or_else(|| contract.get("yes_price"))
                    .or_else(|| contract.get("last_trade_price"))
                    .and_then(Value::as_f64);
                let Some(price) = price else { continue };

                quotes.push(RawQuote {
                    venue_slug: "robinhood".into(),
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
                    volume_usd: None,
                    liquidity_usd: None,
                    market_url: Some(format!("https://robinhood.com/prediction-markets/{event_id}")),
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
impl Worker for RobinhoodWorker {
    fn venue_slug(&self) -> &str {
        "robinhood"
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(120)
    }

    async fn connect(&mut self) -> Result<()> {
        tracing::info!("Robinhood worker initialized (EXPERIMENTAL)");
        Ok(())
    }

    async fn fetch_batch(&mut self) -> Result<Vec<RawQuote>> {
        if self.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
            tracing::warn!(failures = self.consecutive_failures, "Robinhood worker disabled after consecutive failures");
            return Ok(Vec::new());
        }

        let response = match self.http.get(EVENTS_URL).send().await {
            Ok(response) => response,
            Err(err) => {
                self.consecutive_failures += 1;
                tracing::warn!(error = %err, failures = self.consecutive_failures, "Robinhood API error (experimental)");
                return Ok(Vec::new());
            }
        };

        if matches!(
            response.status(),
            reqwest::StatusCode::FORBIDDEN | reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::NOT_FOUND
        ) {
            self.consecutive_failures += 1;
            tracing::warn!(status = %response.status(), failures = self.consecutive_failures, "Robinhood API not accessible");
            return Ok(Vec::new());
        }

        let body = match response.error_for_status() {
            Ok(response) => response.json::<Value>().await,
            Err(err) => {
                self.consecutive_failures += 1;
                tracing::warn!(error = %err, failures = self.consecutive_failures, "Robinhood API error (experimental)");
                return Ok(Vec::new());
            }
        };

        let body = match body {
            Ok(body) => body,
            Err(err) => {
                self.consecutive_failures += 1;
                tracing::error!(error = %err, "Robinhood parse error");
                return Ok(Vec::new());
            }
        };

        self.consecutive_failures = 0;
        let events = body.get("results").or_else(|| body.get("events")).and_then(Value::as_array).cloned().unwrap_or_default();
        Ok(Self::parse_events(&events))
    }

    async fn stop(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_detects_politics() {
        assert_eq!(classify("Will Trump run again?"), Category::Politics);
    }

    #[test]
    fn parse_events_builds_quotes() {
        let event = serde_json::json!({
            "id": "e1",
            "title": "Will the Fed cut rates?",
            "contracts": [
                {"name": "Yes", "price": 0.55},
                {"name": "No", "price": 0.45},
            ]
        });
        let quotes = RobinhoodWorker::parse_events(&[event]);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].category, Category::Economics);
    }

    #[tokio::test]
    async fn fetch_batch_short_circuits_after_max_consecutive_failures() {
        let mut worker = RobinhoodWorker::new();
        worker.consecutive_failures = MAX_CONSECUTIVE_FAILURES;
        assert!(worker.fetch_batch().await.unwrap().is_empty());
    }
}

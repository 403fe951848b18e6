//! Kalshi venue adapter — events/markets discovery with cursor pagination.
//!
//! Kalshi nests markets under events and, for some events, splits a single
//! generic question across many candidate-specific tickers sharing a
//! `yes_sub_title`. Those get folded into per-candidate synthetic titles via
//! [`category_map::build_candidate_title`] so they can match single-candidate
//! markets on other venues.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tokio::time::sleep;

use crate::core::domain::{Category, OutcomeRef, PriceFormat, RawQuote};
use crate::core::publish::url::canonicalize_kalshi_url;
use crate::core::workers::category_map::{build_candidate_title, classify, classify_by_keywords, WHO_WILL_PREFIXES};
use crate::core::workers::Worker;
use crate::error::Result;

const KALSHI_API_BASE: &str = "https://api.elections.kalshi.com/trade-api/v2";
const MAX_PAGES: u32 = 10;
const INTER_PAGE_SLEEP: Duration = Duration::from_millis(1500);

const CATEGORY_LOOKUP: &[(&str, Category)] = &[
    ("Politics", Category::Politics),
    ("Elections", Category::Politics),
    ("Economics", Category::Economics),
    ("Financials", Category::Economics),
    ("Crypto", Category::Crypto),
    ("Climate and Weather", Category::Science),
    ("Science and Technology", Category::Science),
    ("Sports", Category::Sports),
    ("Entertainment", Category::Culture),
    ("Culture", Category::Culture),
];

const KEYWORD_MAP: &[(&str, Category)] = &[
    ("president", Category::Politics),
    ("election", Category::Politics),
    ("senate", Category::Politics),
    ("congress", Category::Politics),
    ("fed ", Category::Economics),
    ("inflation", Category::Economics),
    ("gdp", Category::Economics),
    ("bitcoin", Category::Crypto),
    ("ethereum", Category::Crypto),
    ("crypto", Category::Crypto),
    ("temperature", Category::Science),
    ("hurricane", Category::Science),
    ("nfl", Category::Sports),
    ("nba", Category::Sports),
    ("super bowl", Category::Sports),
];

fn classify_market(native_category: Option<&str>, title: &str) -> Category {
    classify(native_category, CATEGORY_LOOKUP, title, KEYWORD_MAP, Category::Politics)
}

pub struct KalshiWorker {
    http: Client,
}

impl Default for KalshiWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl KalshiWorker {
    #[must_use]
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Value> {
        let mut query = vec![("limit", "200".to_string()), ("with_nested_markets", "true".to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        let page: Value = self
            .http
            .get(format!("{KALSHI_API_BASE}/events"))
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(page)
    }

    async fn fetch_events(&self) -> Result<Vec<Value>> {
        let mut events = Vec::new();
        let mut cursor: Option<String> = None;

        for page_num in 0..MAX_PAGES {
            let page = match self.fetch_page(cursor.as_deref()).await {
                Ok(page) => page,
                Err(err) => {
                    tracing::warn!(error = %err, page = page_num, "kalshi page fetch failed, stopping pagination");
                    break;
                }
            };

            if let Some(page_events) = page.get("events").and_then(Value::as_array) {
                events.extend(page_events.iter().cloned());
            }

            cursor = page
                .get("cursor")
                .and_then(Value::as_str)
                .filter(|c| !c.is_empty())
                .map(str::to_string);
            if cursor.is_none() {
                break;
            }

            sleep(INTER_PAGE_SLEEP).await;
        }

        Ok(events)
    }

    /// Parse one page's worth of events into quotes, rewriting titles for
    /// any multi-candidate series detected via shared `yes_sub_title`.
    fn parse_events(events: &[Value]) -> Vec<RawQuote> {
        let mut candidate_counts: HashMap<String, u32> = HashMap::new();
        let empty = Vec::new();
        for event in events {
            for market in event.get("markets").and_then(Value::as_array).unwrap_or(&empty) {
                if let Some(sub) = market.get("yes_sub_title").and_then(Value::as_str) {
                    if !sub.is_empty() {
                        *candidate_counts.entry(event_title(event).to_string()).or_insert(0) += 1;
                    }
                }
            }
        }

        let captured_at = Utc::now();
        let mut quotes = Vec::new();
        for event in events {
            let title = event_title(event);
            let native_category = event.get("category").and_then(Value::as_str);
            let is_multi_candidate = candidate_counts.get(title).copied().unwrap_or(0) > 1;

            for market in event.get("markets").and_then(Value::as_array).unwrap_or(&empty) {
                let Some(ticker) = market.get("ticker").and_then(Value::as_str) else { continue };
                let yes_sub_title = market.get("yes_sub_title").and_then(Value::as_str);
                let market_title = if is_multi_candidate {
                    match yes_sub_title {
                        Some(candidate) if !candidate.is_empty() => build_candidate_title(title, candidate, WHO_WILL_PREFIXES),
                        _ => title.to_string(),
                    }
                } else {
                    title.to_string()
                };
                let category = classify_market(native_category, &market_title);

                let Some(yes_bid) = market.get("yes_bid").and_then(Value::as_f64) else { continue };
                let yes_ask = market.get("yes_ask").and_then(Value::as_f64);
                let no_bid = market.get("no_bid").and_then(Value::as_f64);
                let no_ask = market.get("no_ask").and_then(Value::as_f64);

                let market_url = canonicalize_kalshi_url(&format!("https://kalshi.com/markets/{ticker}"));
                let outcomes_json = vec![
                    OutcomeRef { name: "Yes".into(), index: 0 },
                    OutcomeRef { name: "No".into(), index: 1 },
                ];
                let volume = market.get("volume").and_then(Value::as_f64);
                let liquidity = market.get("liquidity").and_then(Value::as_f64);

                quotes.push(RawQuote {
                    venue_slug: "kalshi".into(),
                    external_market_id: ticker.to_string(),
                    market_title: market_title.clone(),
                    category,
                    outcome_index: 0,
                    outcome_name: "Yes".into(),
                    price: yes_bid,
                    price_format: PriceFormat::Cents,
                    bid: Some(yes_bid),
                    ask: yes_ask,
                    volume_24h: None,
                    volume_usd: volume,
                    liquidity_usd: liquidity,
                    market_url: Some(market_url.clone()),
                    description: None,
                    end_date: None,
                    outcomes_json: outcomes_json.clone(),
                    captured_at,
                });
                quotes.push(RawQuote {
                    venue_slug: "kalshi".into(),
                    external_market_id: ticker.to_string(),
                    market_title,
                    category,
                    outcome_index: 1,
                    outcome_name: "No".into(),
                    price: no_bid.unwrap_or(100.0 - yes_ask.unwrap_or(yes_bid)),
                    price_format: PriceFormat::Cents,
                    bid: no_bid,
                    ask: no_ask,
                    volume_24h: None,
                    volume_usd: volume,
                    liquidity_usd: liquidity,
                    market_url: Some(market_url),
                    description: None,
                    end_date: None,
                    outcomes_json,
                    captured_at,
                });
            }
        }
        quotes
    }
}

fn event_title(event: &Value) -> &str {
    event.get("title").and_then(Value::as_str).unwrap_or_default()
}

#[async_trait]
impl Worker for KalshiWorker {
    fn venue_slug(&self) -> &str {
        "kalshi"
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(30)
    }

    async fn connect(&mut self) -> Result<()> {
        tracing::info!("connected to Kalshi trade API");
        Ok(())
    }

    async fn fetch_batch(&mut self) -> Result<Vec<RawQuote>> {
        let events = self.fetch_events().await?;
        Ok(Self::parse_events(&events))
    }

    async fn stop(&mut self) {}
}

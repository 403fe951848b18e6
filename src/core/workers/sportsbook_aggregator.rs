//! Sportsbook aggregator — one upstream quota-limited odds-comparison API
//! covering several US sportsbooks at once.
//!
//! This worker polls a single upstream endpoint but fans its output out
//! across several venues: `venue_slug` on each emitted quote is the
//! *bookmaker* (`draftkings`, `fanduel`, `betmgm`, ...), not this worker's
//! own name — the aggregator itself never appears as a venue in the live
//! cache. A 500-request/month quota drives the unusually long poll interval.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use crate::core::domain::{Category, OutcomeRef, PriceFormat, RawQuote};
use crate::core::workers::Worker;
use crate::error::Result;

const API_BASE: &str = "https://api.the-odds-api.com/v4";
const BOOKMAKERS: &str = "draftkings,fanduel,betmgm,bovada,betrivers";

/// Sports fetched each tick; each maps to a fixed category (this source
/// covers sports almost exclusively, with one political carve-out upstream
/// never exercised by the sports fetched here).
const SPORTS_TO_FETCH: &[&str] = &[
    "americanfootball_nfl",
    "basketball_nba",
    "baseball_mlb",
    "icehockey_nhl",
    "soccer_epl",
    "mma_mixed_martial_arts",
];

pub struct SportsbookAggregatorWorker {
    http: Client,
    api_key: Option<String>,
}

impl SportsbookAggregatorWorker {
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self { http: Client::new(), api_key }
    }

    async fn fetch_sport(&self, sport_key: &str) -> Result<Vec<Value>> {
        let Some(api_key) = self.api_key.as_deref() else { return Ok(Vec::new()) };
        let response = self
            .http
            .get(format!("{API_BASE}/sports/{sport_key}/odds/"))
            .query(&[
                ("apiKey", api_key),
                ("regions", "us"),
                ("markets", "h2h"),
                ("oddsFormat", "american"),
                ("bookmakers", BOOKMAKERS),
            ])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            tracing::error!("sportsbook aggregator: invalid API key");
            return Ok(Vec::new());
        }
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("sportsbook aggregator: rate limited, stopping this tick");
            return Ok(Vec::new());
        }

        let events: Vec<Value> = response.error_for_status()?.json().await?;
        Ok(events)
    }

    fn parse_events(events: &[Value], category: Category) -> Vec<RawQuote> {
        let captured_at = Utc::now();
        let empty = Vec::new();
        let mut quotes = Vec::new();

        for event in events {
            let event_id = event.get("id").and_then(Value::as_str).unwrap_or_default();
            let home = event.get("home_team").and_then(Value::as_str).unwrap_or_default();
            let away = event.get("away_team").and_then(Value::as_str).unwrap_or_default();
            let title = if !home.is_empty() && !away.is_empty() { format!("{away} @ {home}") } else { event_id.to_string() };

            for bookmaker in event.get("bookmakers").and_then(Value::as_array).unwrap_or(&empty) {
                let bookmaker_key = bookmaker.get("key").and_then(Value::as_str).unwrap_or_default();
                if bookmaker_key.is_empty() {
                    continue;
                }
                for market in bookmaker.get("markets").and_then(Value::as_array).unwrap_or(&empty) {
                    if market.get("key").and_then(Value::as_str) != Some("h2h") {
                        continue;
                    }
                    let outcomes = market.get("outcomes").and_then(Value::as_array).unwrap_or(&empty);
                    let outcomes_json: Vec<OutcomeRef> = outcomes
                        .iter()
                        .enumerate()
                        .map(|(i, o)| OutcomeRef { name: o.get("name").and_then(Value::as_str).unwrap_or_default().to_string(), index: i as u32 })
                        .collect();

                    for (i, outcome) in outcomes.iter().enumerate() {
                        let name = outcome.get("name").and_then(Value::as_str).unwrap_or_default();
                        let Some(price) = outcome.get("price").and_then(Value::as_f64) else { continue };
                        if price == 0.0 {
                            continue;
                        }
                        let price_format = if price < 0.0 { PriceFormat::AmericanNegative } else { PriceFormat::AmericanPositive };

                        quotes.push(RawQuote {
                            venue_slug: bookmaker_key.to_string(),
                            external_market_id: format!("{event_id}_{bookmaker_key}"),
                            market_title: title.clone(),
                            category,
                            outcome_index: i as u32,
                            outcome_name: name.to_string(),
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
                            outcomes_json: outcomes_json.clone(),
                            captured_at,
                        });
                    }
                }
            }
        }
        quotes
    }
}

#[async_trait]
impl Worker for SportsbookAggregatorWorker {
    fn venue_slug(&self) -> &str {
        "sportsbook_aggregator"
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(300)
    }

    async fn connect(&mut self) -> Result<()> {
        if self.api_key.is_none() {
            tracing::warn!("sportsbook aggregator API key not set, worker will not fetch data");
        }
        tracing::info!(has_key = self.api_key.is_some(), "connected to sportsbook aggregator API");
        Ok(())
    }

    async fn fetch_batch(&mut self) -> Result<Vec<RawQuote>> {
        if self.api_key.is_none() {
            return Ok(Vec::new());
        }
        let mut all_quotes = Vec::new();
        for sport_key in SPORTS_TO_FETCH {
            let events = self.fetch_sport(sport_key).await?;
            all_quotes.extend(Self::parse_events(&events, Category::Sports));
        }
        Ok(all_quotes)
    }

    async fn stop(&mut self) {}
}

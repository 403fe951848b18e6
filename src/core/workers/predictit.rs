//! PredictIt venue adapter — one flat `marketdata/all` endpoint, no
//! pagination or auth.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use crate::core::domain::{Category, OutcomeRef, PriceFormat, RawQuote};
use crate::core::workers::category_map::{build_candidate_title, classify_by_keywords, WHICH_PARTY_PREFIXES, WHO_WILL_PREFIXES};
use crate::core::workers::Worker;
use crate::error::Result;

const PREDICTIT_API_URL: &str = "https://www.predictit.org/api/marketdata/all/";

const KEYWORD_MAP: &[(&str, Category)] = &[
    ("politics", Category::Politics),
    ("president", Category::Politics),
    ("congress", Category::Politics),
    ("senate", Category::Politics),
    ("house", Category::Politics),
    ("election", Category::Politics),
    ("trump", Category::Politics),
    ("democrat", Category::Politics),
    ("republican", Category::Politics),
    ("governor", Category::Politics),
    ("economy", Category::Economics),
    ("fed", Category::Economics),
    ("inflation", Category::Economics),
    ("bitcoin", Category::Crypto),
    ("crypto", Category::Crypto),
    ("world", Category::Politics),
    ("science", Category::Science),
    ("climate", Category::Science),
];

fn classify_category(name: &str) -> Category {
    classify_by_keywords(name, KEYWORD_MAP, Category::Politics)
}

/// PredictIt folds each candidate into its own binary market when a
/// multi-candidate market's contracts aren't simply Yes/No.
fn is_multi_candidate(contract_names: &[&str]) -> bool {
    contract_names.len() > 1
        && !contract_names.iter().all(|n| n.eq_ignore_ascii_case("yes") || n.eq_ignore_ascii_case("no"))
}

fn build_title(generic_title: &str, candidate: &str) -> String {
    let lower = generic_title.trim().to_lowercase();
    if lower.starts_with("which party will win ") {
        build_candidate_title(generic_title, candidate, WHICH_PARTY_PREFIXES)
    } else {
        build_candidate_title(generic_title, candidate, WHO_WILL_PREFIXES)
    }
}

pub struct PredictItWorker {
    http: Client,
}

impl Default for PredictItWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictItWorker {
    #[must_use]
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    async fn fetch_markets_json(&self) -> Result<Vec<Value>> {
        let body: Value = self.http.get(PREDICTIT_API_URL).send().await?.error_for_status()?.json().await?;
        Ok(body.get("markets").and_then(Value::as_array).cloned().unwrap_or_default())
    }

    fn parse_market(market: &Value) -> Vec<RawQuote> {
        if market.get("status").and_then(Value::as_str) != Some("Open") {
            return Vec::new();
        }
        let market_id = market.get("id").map_or_else(String::new, |v| v.to_string().trim_matches('"').to_string());
        let market_name = market.get("name").and_then(Value::as_str).unwrap_or_default();
        let market_url = market.get("url").and_then(Value::as_str).map(str::to_string);
        let category = classify_category(market_name);
        let empty = Vec::new();
        let contracts = market.get("contracts").and_then(Value::as_array).unwrap_or(&empty);

        let contract_names: Vec<&str> = contracts.iter().map(|c| c.get("name").and_then(Value::as_str).unwrap_or_default()).collect();
        let multi = is_multi_candidate(&contract_names);
        let captured_at = Utc::now();

        let mut quotes = Vec::new();
        for (i, contract) in contracts.iter().enumerate() {
            let Some(last_trade) = contract.get("lastTradePrice").and_then(Value::as_f64) else { continue };
            let name = contract
                .get("name")
                .and_then(Value::as_str)
                .or_else(|| contract.get("shortName").and_then(Value::as_str))
                .unwrap_or("Option");
            let best_buy_yes = contract.get("bestBuyYesCost").and_then(Value::as_f64);
            let best_buy_no = contract.get("bestBuyNoCost").and_then(Value::as_f64);

            if multi {
                let title = build_title(market_name, name);
                let ext_id = format!("{market_id}_c{i}");
                let outcomes_json = vec![
                    OutcomeRef { name: "Yes".into(), index: 0 },
                    OutcomeRef { name: "No".into(), index: 1 },
                ];
                let no_price = best_buy_no.unwrap_or(1.0 - last_trade);

                quotes.push(RawQuote {
                    venue_slug: "predictit".into(),
                    external_market_id: ext_id.clone(),
                    market_title: title.clone(),
                    category,
                    outcome_index: 0,
                    outcome_name: "Yes".into(),
                    price: last_trade,
                    price_format: PriceFormat::Probability,
                    bid: best_buy_yes,
                    ask: None,
                    volume_24h: None,
                    volume_usd: None,
                    liquidity_usd: None,
                    market_url: market_url.clone(),
                    description: None,
                    end_date: None,
                    outcomes_json: outcomes_json.clone(),
                    captured_at,
                });
                quotes.push(RawQuote {
                    venue_slug: "predictit".into(),
                    external_market_id: ext_id,
                    market_title: title,
                    category,
                    outcome_index: 1,
                    outcome_name: "No".into(),
                    price: no_price,
                    price_format: PriceFormat::Probability,
                    bid: None,
                    ask: best_buy_no,
                    volume_24h: None,
                    volume_usd: None,
                    liquidity_usd: None,
                    market_url: market_url.clone(),
                    description: None,
                    end_date: None,
                    outcomes_json,
                    captured_at,
                });
            } else {
                let outcomes_json: Vec<OutcomeRef> = contracts
                    .iter()
                    .enumerate()
                    .map(|(j, c)| OutcomeRef { name: c.get("name").and_then(Value::as_str).unwrap_or_default().to_string(), index: j as u32 })
                    .collect();
                quotes.push(RawQuote {
                    venue_slug: "predictit".into(),
                    external_market_id: market_id.clone(),
                    market_title: market_name.to_string(),
                    category,
                    outcome_index: i as u32,
                    outcome_name: name.to_string(),
                    price: last_trade,
                    price_format: PriceFormat::Probability,
                    bid: best_buy_yes,
                    ask: best_buy_no,
                    volume_24h: None,
                    volume_usd: None,
                    liquidity_usd: None,
                    market_url: market_url.clone(),
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

#[async_trait]
impl Worker for PredictItWorker {
    fn venue_slug(&self) -> &str {
        "predictit"
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(60)
    }

    async fn connect(&mut self) -> Result<()> {
        tracing::info!("connected to PredictIt API");
        Ok(())
    }

    async fn fetch_batch(&mut self) -> Result<Vec<RawQuote>> {
        let markets = self.fetch_markets_json().await?;
        Ok(markets.iter().flat_map(Self::parse_market).collect())
    }

    async fn stop(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_category_keyword_match() {
        assert_eq!(classify_category("2028 Presidential Election"), Category::Politics);
    }

    #[test]
    fn classify_category_default() {
        assert_eq!(classify_category("something unrelated"), Category::Politics);
    }

    #[test]
    fn is_multi_candidate_true_for_named_contracts() {
        assert!(is_multi_candidate(&["Gavin Newsom", "Kamala Harris", "JB Pritzker"]));
    }

    #[test]
    fn is_multi_candidate_false_for_yes_no() {
        assert!(!is_multi_candidate(&["Yes", "No"]));
    }

    #[test]
    fn parse_market_splits_multi_candidate_into_binary_pairs() {
        let market = serde_json::json!({
            "id": 7221,
            "name": "Who will win the 2028 Democratic nomination?",
            "status": "Open",
            "url": "https://predictit.org/markets/7221",
            "contracts": [
                {"name": "Gavin Newsom", "lastTradePrice": 0.3, "bestBuyYesCost": 0.31},
                {"name": "Kamala Harris", "lastTradePrice": 0.25, "bestBuyYesCost": 0.26},
            ]
        });
        let quotes = PredictItWorker::parse_market(&market);
        assert_eq!(quotes.len(), 4);
        assert_eq!(quotes[0].market_title, "Will Gavin Newsom win the 2028 Democratic nomination?");
        assert_eq!(quotes[0].outcome_name, "Yes");
        assert_eq!(quotes[1].outcome_name, "No");
        assert!((quotes[1].price - 0.7).abs() < 1e-9);
    }

    #[test]
    fn parse_market_keeps_single_candidate_markets_verbatim() {
        let market = serde_json::json!({
            "id": 1,
            "name": "Will the bill pass?",
            "status": "Open",
            "contracts": [
                {"name": "Yes", "lastTradePrice": 0.6},
                {"name": "No", "lastTradePrice": 0.4},
            ]
        });
        let quotes = PredictItWorker::parse_market(&market);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].market_title, "Will the bill pass?");
    }

    #[test]
    fn parse_market_skips_closed_markets() {
        let market = serde_json::json!({"id": 1, "name": "Closed market", "status": "Closed", "contracts": []});
        assert!(PredictItWorker::parse_market(&market).is_empty());
    }

    #[test]
    fn parse_market_skips_contracts_without_last_trade() {
        let market = serde_json::json!({
            "id": 1, "name": "No trades yet", "status": "Open",
            "contracts": [{"name": "Yes"}, {"name": "No"}]
        });
        assert!(PredictItWorker::parse_market(&market).is_empty());
    }
}

//! `oddsaxiom opportunities` — print the currently active arbitrage
//! opportunities from the ranked set, highest profit margin first.
//!
//! This is a thin CLI read of §4.6's output, standing in for the excluded
//! read-API surface layer — it is not that API, just the nearest runnable
//! equivalent this crate can expose on its own.

use tabled::{Table, Tabled};

use crate::app::config::Config;
use crate::app::orchestrator;
use crate::error::Result;

use super::OpportunitiesArgs;

#[derive(Tabled)]
struct OpportunityRow {
    #[tabled(rename = "Canonical title")]
    canonical_title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Legs")]
    legs: usize,
    #[tabled(rename = "Profit")]
    profit: String,
    #[tabled(rename = "Detected at")]
    detected_at: String,
}

/// Connect to the stores, fetch up to `args.limit` active opportunities,
/// and print them as a table.
///
/// # Errors
/// Returns an error if configuration fails to load or the opportunity
/// store is unreachable.
pub async fn execute(config_path: &std::path::Path, args: OpportunitiesArgs) -> Result<()> {
    let config = Config::load(config_path)?;
    let state = orchestrator::build_state(&config).await?;

    let opportunities = state.opportunity_store.top(args.limit).await?;
    if opportunities.is_empty() {
        println!("no active arbitrage opportunities");
        return Ok(());
    }

    let rows: Vec<OpportunityRow> = opportunities
        .iter()
        .map(|opp| OpportunityRow {
            canonical_title: opp.canonical_title.clone(),
            category: opp.category.to_string(),
            legs: opp.legs.len(),
            profit: format!("{:.3}%", opp.expected_profit * 100.0),
            detected_at: opp.detected_at.to_rfc3339(),
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

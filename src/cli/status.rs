//! `oddsaxiom status` — report which venues are enabled.

use tabled::{Table, Tabled};

use crate::app::config::Config;
use crate::error::Result;

#[derive(Tabled)]
struct VenueRow {
    #[tabled(rename = "Venue")]
    venue: &'static str,
    #[tabled(rename = "Enabled")]
    enabled: &'static str,
}

/// Load configuration and print one row per known venue with its current
/// enablement.
///
/// # Errors
/// Returns an error if configuration fails to load.
pub fn execute(config_path: &std::path::Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let enabled = config.enabled_venues();

    let rows: Vec<VenueRow> = [
        "polymarket",
        "kalshi",
        "predictit",
        "limitless",
        "sportsbook_aggregator",
        "coinbase",
        "gemini",
        "robinhood",
    ]
    .into_iter()
    .map(|venue| VenueRow {
        venue,
        enabled: if enabled.contains(&venue) { "yes" } else { "no" },
    })
    .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

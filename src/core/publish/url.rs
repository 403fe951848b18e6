//! Kalshi serves only series-level market pages; the per-market ticker
//! returned by its API (e.g. `KXPRES-24-DJT`) must be rewritten down to its
//! series ticker segment (`kxpres`) before the URL is published, or the link
//! 404s.
//!
//! Ported from the reference implementation's `_fix_kalshi_url`: the series
//! ticker is everything before the first `-` in the market ticker, lower-cased.

use url::Url;

/// Rewrite the final path segment of a Kalshi market URL from its per-market
/// ticker down to its series ticker. Returns `market_url` unchanged if it
/// doesn't parse as a URL or has no path segments to rewrite.
#[must_use]
pub fn canonicalize_kalshi_url(market_url: &str) -> String {
    let Ok(mut url) = Url::parse(market_url) else {
        return market_url.to_string();
    };

    let segments: Vec<String> = match url.path_segments() {
        Some(segments) => segments.map(str::to_string).collect(),
        None => return market_url.to_string(),
    };
    let Some(last) = segments.last() else {
        return market_url.to_string();
    };

    let series_ticker = series_ticker_from_market_ticker(last);
    let mut new_segments = segments[..segments.len() - 1].to_vec();
    new_segments.push(series_ticker);

    url.set_path(&new_segments.join("/"));
    url.to_string()
}

/// A Kalshi market ticker's series segment is everything before its first
/// `-` (the date/outcome suffix), lower-cased.
fn series_ticker_from_market_ticker(market_ticker: &str) -> String {
    market_ticker
        .split('-')
        .next()
        .unwrap_or(market_ticker)
        .to_lowercase()
}

//! The engine's in-memory per-canonical-title buffer, with an explicit
//! title-level state machine: `Empty -> Partial -> Covered -> ArbHot`, with
//! `Stale` reachable from any non-`Empty` state once a title stops
//! receiving updates.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::core::domain::{Category, NormalisedQuote};

/// A canonical title's coverage state, from the engine's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleState {
    /// No legs buffered yet.
    Empty,
    /// At least one outcome is covered by fewer than two venues.
    Partial,
    /// Every outcome covered, and at least one outcome has two or more
    /// venues quoting it, but the last detection pass found no arbitrage.
    Covered,
    /// The last detection pass on this title emitted an opportunity.
    /// Informational only — cleared back to `Partial`/`Covered` on the
    /// next update.
    ArbHot,
    /// No update received within the staleness window; the buffered legs
    /// are no longer trustworthy and should be excluded from detection
    /// until refreshed or recluster clears them.
    Stale,
}

/// One canonical title's buffered state: `outcome_name -> venue_slug ->
/// latest NormalisedQuote`. A fresh quote from venue V on outcome O
/// replaces only the previous V/O entry — older quotes from other venues
/// on the same outcome are left in place, per spec for `OpportunityBuffer`.
#[derive(Debug, Clone)]
pub struct BufferEntry {
    pub canonical_title: String,
    pub category: Category,
    pub legs: HashMap<String, HashMap<String, NormalisedQuote>>,
    pub last_updated: DateTime<Utc>,
    pub state: TitleState,
}

impl BufferEntry {
    /// For each outcome, the quote with the lowest `implied_prob` across
    /// all venues currently quoting it. This is recomputed at detection
    /// time, never cached, since "best" only makes sense as of now.
    #[must_use]
    pub fn best_legs(&self) -> HashMap<String, NormalisedQuote> {
        self.legs
            .iter()
            .filter_map(|(outcome, venues)| {
                venues
                    .values()
                    .min_by(|a, b| a.implied_prob.total_cmp(&b.implied_prob))
                    .cloned()
                    .map(|q| (outcome.clone(), q))
            })
            .collect()
    }

    fn recompute_coverage_state(&mut self) {
        if self.legs.is_empty() {
            self.state = TitleState::Empty;
            return;
        }
        let under_covered = self.legs.values().any(|venues| venues.len() < 2);
        self.state = if under_covered {
            TitleState::Partial
        } else {
            TitleState::Covered
        };
    }

    /// Called by the detection subtask once it has emitted an opportunity
    /// for this title.
    pub fn mark_arb_hot(&mut self) {
        self.state = TitleState::ArbHot;
    }
}

/// In-memory buffer keyed by canonical title. Not thread-safe on its own —
/// the engine wraps it in a mutex, consistent with how the rest of this
/// pipeline shares mutable state across its sibling tasks.
#[derive(Debug, Default)]
pub struct OpportunityBuffer {
    entries: HashMap<String, BufferEntry>,
}

impl OpportunityBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a fresh batch of normalised quotes, all sharing the same
    /// canonical title, into the buffer. Each quote replaces the prior
    /// quote from the same venue on the same outcome; quotes from other
    /// venues on that outcome are untouched.
    pub fn update(&mut self, canonical_title: &str, category: Category, quotes: &[NormalisedQuote]) {
        let admissible: Vec<&NormalisedQuote> = quotes.iter().filter(|q| q.is_admissible()).collect();
        if admissible.is_empty() && !self.entries.contains_key(canonical_title) {
            return;
        }

        let entry = self
            .entries
            .entry(canonical_title.to_string())
            .or_insert_with(|| BufferEntry {
                canonical_title: canonical_title.to_string(),
                category,
                legs: HashMap::new(),
                last_updated: Utc::now(),
                state: TitleState::Empty,
            });

        for quote in admissible {
            entry
                .legs
                .entry(quote.outcome_name.clone())
                .or_default()
                .insert(quote.venue_slug.clone(), quote.clone());
        }
        entry.last_updated = Utc::now();
        entry.recompute_coverage_state();
    }

    #[must_use]
    pub fn get(&self, canonical_title: &str) -> Option<&BufferEntry> {
        self.entries.get(canonical_title)
    }

    pub fn get_mut(&mut self, canonical_title: &str) -> Option<&mut BufferEntry> {
        self.entries.get_mut(canonical_title)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Mark every entry whose last update is older than `ttl` as
    /// [`TitleState::Stale`], and return the titles that transitioned.
    pub fn sweep_stale(&mut self, ttl: Duration, now: DateTime<Utc>) -> Vec<String> {
        let mut newly_stale = Vec::new();
        for entry in self.entries.values_mut() {
            if entry.state == TitleState::Stale {
                continue;
            }
            let age = (now - entry.last_updated)
                .to_std()
                .unwrap_or(Duration::ZERO);
            if age >= ttl {
                entry.state = TitleState::Stale;
                newly_stale.push(entry.canonical_title.clone());
            }
        }
        newly_stale
    }

    /// Drop a title's buffered legs entirely — used when its cluster is
    /// resolved/closed and it should no longer be considered for
    /// detection.
    pub fn remove(&mut self, canonical_title: &str) -> Option<BufferEntry> {
        self.entries.remove(canonical_title)
    }

    /// Merge `other`'s legs into `into`'s sub-buffer, preferring the
    /// freshest quote per venue/outcome, and drop `other`'s own key. Used
    /// by reclustering when a raw title's canonical representative
    /// changes.
    pub fn merge_into(&mut self, other: &str, into: &str) {
        let Some(moved) = self.entries.remove(other) else {
            return;
        };
        let target = self.entries.entry(into.to_string()).or_insert_with(|| BufferEntry {
            canonical_title: into.to_string(),
            category: moved.category,
            legs: HashMap::new(),
            last_updated: moved.last_updated,
            state: TitleState::Empty,
        });
        for (outcome, venues) in moved.legs {
            let slot = target.legs.entry(outcome).or_default();
            for (venue, quote) in venues {
                slot.entry(venue)
                    .and_modify(|existing| {
                        if quote.captured_at > existing.captured_at {
                            *existing = quote.clone();
                        }
                    })
                    .or_insert(quote);
            }
        }
        target.last_updated = target.last_updated.max(moved.last_updated);
        target.recompute_coverage_state();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(venue: &str, outcome: &str, implied_prob: f64) -> NormalisedQuote {
        NormalisedQuote {
            venue_slug: venue.into(),
            external_market_id: format!("{venue}-m"),
            market_title: "Will it rain?".into(),
            category: Category::Science,
            outcome_index: 0,
            outcome_name: outcome.into(),
            price: implied_prob,
            implied_prob,
            bid: None,
            ask: None,
            volume_24h: None,
            volume_usd: None,
            liquidity_usd: None,
            market_url: None,
            description: None,
            end_date: None,
            outcomes_json: vec![],
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn empty_buffer_has_no_entry() {
        let buffer = OpportunityBuffer::new();
        assert!(buffer.get("Will it rain?").is_none());
    }

    #[test]
    fn single_outcome_single_venue_is_partial() {
        let mut buffer = OpportunityBuffer::new();
        buffer.update(
            "Will it rain?",
            Category::Science,
            &[quote("polymarket", "Yes", 0.47)],
        );
        assert_eq!(buffer.get("Will it rain?").unwrap().state, TitleState::Partial);
    }

    #[test]
    fn one_outcome_with_two_venues_but_other_outcome_with_one_is_still_partial() {
        let mut buffer = OpportunityBuffer::new();
        buffer.update(
            "Will it rain?",
            Category::Science,
            &[
                quote("polymarket", "Yes", 0.47),
                quote("kalshi", "Yes", 0.48),
                quote("polymarket", "No", 0.5),
            ],
        );
        assert_eq!(buffer.get("Will it rain?").unwrap().state, TitleState::Partial);
    }

    #[test]
    fn every_outcome_with_two_venues_is_covered() {
        let mut buffer = OpportunityBuffer::new();
        buffer.update(
            "Will it rain?",
            Category::Science,
            &[
                quote("polymarket", "Yes", 0.55),
                quote("kalshi", "Yes", 0.5),
                quote("polymarket", "No", 0.45),
                quote("kalshi", "No", 0.5),
            ],
        );
        assert_eq!(buffer.get("Will it rain?").unwrap().state, TitleState::Covered);
    }

    #[test]
    fn a_second_quote_from_the_same_venue_replaces_rather_than_adds() {
        let mut buffer = OpportunityBuffer::new();
        buffer.update(
            "Will it rain?",
            Category::Science,
            &[quote("polymarket", "Yes", 0.55)],
        );
        buffer.update(
            "Will it rain?",
            Category::Science,
            &[quote("polymarket", "Yes", 0.40)],
        );
        let entry = buffer.get("Will it rain?").unwrap();
        assert_eq!(entry.legs["Yes"].len(), 1);
        assert_eq!(entry.legs["Yes"]["polymarket"].implied_prob, 0.40);
    }

    #[test]
    fn best_legs_takes_the_minimum_across_venues_per_outcome() {
        let mut buffer = OpportunityBuffer::new();
        buffer.update(
            "Will it rain?",
            Category::Science,
            &[quote("polymarket", "Yes", 0.55), quote("kalshi", "Yes", 0.40)],
        );
        let best = buffer.get("Will it rain?").unwrap().best_legs();
        assert_eq!(best["Yes"].venue_slug, "kalshi");
    }

    #[test]
    fn inadmissible_quotes_are_ignored_and_create_no_entry() {
        let mut buffer = OpportunityBuffer::new();
        buffer.update(
            "Will it rain?",
            Category::Science,
            &[quote("polymarket", "Yes", 0.0)],
        );
        assert!(buffer.get("Will it rain?").is_none());
    }

    #[test]
    fn mark_arb_hot_is_overridden_by_the_next_update() {
        let mut buffer = OpportunityBuffer::new();
        buffer.update(
            "Will it rain?",
            Category::Science,
            &[quote("polymarket", "Yes", 0.47)],
        );
        buffer.get_mut("Will it rain?").unwrap().mark_arb_hot();
        assert_eq!(buffer.get("Will it rain?").unwrap().state, TitleState::ArbHot);
        buffer.update(
            "Will it rain?",
            Category::Science,
            &[quote("kalshi", "Yes", 0.45)],
        );
        assert_eq!(buffer.get("Will it rain?").unwrap().state, TitleState::Partial);
    }

    #[test]
    fn sweep_stale_transitions_entries_past_ttl() {
        let mut buffer = OpportunityBuffer::new();
        buffer.update(
            "Will it rain?",
            Category::Science,
            &[quote("polymarket", "Yes", 0.47)],
        );
        let future = Utc::now() + chrono::Duration::seconds(120);
        let stale = buffer.sweep_stale(Duration::from_secs(60), future);
        assert_eq!(stale, vec!["Will it rain?".to_string()]);
        assert_eq!(buffer.get("Will it rain?").unwrap().state, TitleState::Stale);
    }

    #[test]
    fn merge_into_keeps_the_freshest_quote_per_venue_outcome() {
        let mut buffer = OpportunityBuffer::new();
        buffer.update(
            "Will it rain tomorrow?",
            Category::Science,
            &[quote("polymarket", "Yes", 0.50)],
        );
        buffer.update(
            "Will it rain?",
            Category::Science,
            &[quote("kalshi", "Yes", 0.45)],
        );
        buffer.merge_into("Will it rain tomorrow?", "Will it rain?");
        assert!(buffer.get("Will it rain tomorrow?").is_none());
        let merged = buffer.get("Will it rain?").unwrap();
        assert_eq!(merged.legs["Yes"].len(), 2);
    }
}

//! Cross-venue title clustering.
//!
//! [`Matcher::cluster`] runs a single-pass greedy clustering algorithm:
//! titles are processed in the order they're presented (the order workers
//! report them in, within one engine cycle), each compared against the
//! representative of every cluster opened so far. The first cluster that
//! passes every gate in [`gates`] and scores at or above the merge
//! threshold wins; if none does, the title opens its own singleton cluster
//! with itself as representative. The result is a [`CanonicalTitleMap`].

pub mod cache;
pub mod gates;
pub mod similarity;

use std::collections::HashSet;

use crate::core::domain::{CanonicalTitleMap, Category};

/// Score (0-100) at or above which two titles are considered the same
/// market when no same-venue exact-match gate applies.
pub const MERGE_THRESHOLD: f64 = 82.0;

/// One title to be clustered, as surfaced by a worker within one engine
/// cycle.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub title: String,
    pub venue_slug: String,
    pub category: Option<Category>,
}

struct Cluster {
    representative: String,
    representative_norm: String,
    category: Option<Category>,
    years: HashSet<u16>,
    venues: HashSet<String>,
}

/// Stateless clustering entry point — owns no data of its own, just the
/// algorithm. A fresh [`CanonicalTitleMap`] is built from scratch on every
/// call; callers that want cross-cycle stability wrap this behind
/// [`cache::MatcherCache`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Matcher;

impl Matcher {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Cluster a batch of candidates into a [`CanonicalTitleMap`].
    ///
    /// Candidates are consumed in the order given; earlier titles become
    /// cluster representatives more often than later ones, which is why
    /// feeding candidates in a stable, deterministic order (e.g. by venue
    /// then by market id) matters for reproducible clustering across
    /// cycles.
    #[must_use]
    pub fn cluster(&self, candidates: &[Candidate]) -> CanonicalTitleMap {
        let mut clusters: Vec<Cluster> = Vec::new();
        let mut map = CanonicalTitleMap::new();

        for candidate in candidates {
            let norm = normalise_title(&candidate.title);
            if norm.is_empty() {
                map.insert(candidate.title.clone(), candidate.title.clone());
                continue;
            }
            let years = extract_years(&norm);

            let matched = clusters.iter_mut().find(|cluster| {
                gates::category_gate(candidate.category, cluster.category)
                    && gates::year_gate(&years, &cluster.years)
                    && gates::semantic_conflict_gate(&norm, &cluster.representative_norm)
                    && {
                        let venue_already_in_cluster =
                            cluster.venues.contains(&candidate.venue_slug);
                        gates::same_venue_gate(
                            venue_already_in_cluster,
                            &norm,
                            &cluster.representative_norm,
                        ) && (venue_already_in_cluster
                            || similarity::token_sort_ratio(&norm, &cluster.representative_norm)
                                >= MERGE_THRESHOLD)
                    }
            });

            match matched {
                Some(cluster) => {
                    cluster.venues.insert(candidate.venue_slug.clone());
                    cluster.years.extend(years);
                    if cluster.category.is_none() {
                        cluster.category = candidate.category;
                    }
                    map.insert(candidate.title.clone(), cluster.representative.clone());
                }
                None => {
                    let mut venues = HashSet::new();
                    venues.insert(candidate.venue_slug.clone());
                    clusters.push(Cluster {
                        representative: candidate.title.clone(),
                        representative_norm: norm,
                        category: candidate.category,
                        years,
                        venues,
                    });
                    map.insert(candidate.title.clone(), candidate.title.clone());
                }
            }
        }

        map
    }
}

/// Lower-case, strip a trailing `?`, drop parenthesised/bracketed asides,
/// and collapse whitespace.
#[must_use]
pub fn normalise_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut depth: i32 = 0;
    for ch in title.chars() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = (depth - 1).max(0),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out.trim()
        .trim_end_matches('?')
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pull every 4-digit run in `[1900, 2999]` out of a normalised title.
#[must_use]
pub fn extract_years(norm_title: &str) -> HashSet<u16> {
    let mut years = HashSet::new();
    let bytes: Vec<char> = norm_title.chars().collect();
    let mut i = 0;
    while i + 4 <= bytes.len() {
        let window: String = bytes[i..i + 4].iter().collect();
        let boundary_before = i == 0 || !bytes[i - 1].is_ascii_digit();
        let boundary_after = i + 4 == bytes.len() || !bytes[i + 4].is_ascii_digit();
        if boundary_before && boundary_after {
            if let Ok(year) = window.parse::<u16>() {
                if (1900..=2999).contains(&year) {
                    years.insert(year);
                }
            }
        }
        i += 1;
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, venue: &str, category: Category) -> Candidate {
        Candidate {
            title: title.into(),
            venue_slug: venue.into(),
            category: Some(category),
        }
    }

    #[test]
    fn normalise_title_strips_question_mark_and_parens() {
        assert_eq!(
            normalise_title("Will it Rain Tomorrow? (NYC)"),
            "will it rain tomorrow"
        );
    }

    #[test]
    fn extract_years_finds_standalone_four_digit_runs() {
        let years = extract_years("will republican win the 2028 presidency");
        assert!(years.contains(&2028));
        assert_eq!(years.len(), 1);
    }

    #[test]
    fn extract_years_ignores_digits_inside_longer_runs() {
        let years = extract_years("market id 120280 test");
        assert!(years.is_empty());
    }

    #[test]
    fn cross_venue_similar_titles_merge_into_one_cluster() {
        let matcher = Matcher::new();
        let candidates = vec![
            candidate(
                "Will the Republican win the 2028 presidency?",
                "polymarket",
                Category::Politics,
            ),
            candidate(
                "Will the republican party win the 2028 presidency",
                "kalshi",
                Category::Politics,
            ),
        ];
        let map = matcher.cluster(&candidates);
        assert_eq!(
            map.resolve("Will the republican party win the 2028 presidency"),
            map.resolve("Will the Republican win the 2028 presidency?")
        );
    }

    #[test]
    fn different_categories_never_merge() {
        let matcher = Matcher::new();
        // Near-identical titles (differ only by trailing punctuation, so
        // normalisation and token-sort-ratio alone would merge them) but
        // with conflicting known categories — the category gate must keep
        // them in separate clusters.
        let candidates = vec![
            candidate("Will it rain tomorrow?", "polymarket", Category::Science),
            candidate("Will it rain tomorrow", "kalshi", Category::Politics),
        ];
        let map = matcher.cluster(&candidates);
        assert_ne!(
            map.resolve("Will it rain tomorrow?"),
            map.resolve("Will it rain tomorrow")
        );
    }

    #[test]
    fn same_venue_similar_but_not_identical_titles_stay_separate() {
        let matcher = Matcher::new();
        let candidates = vec![
            candidate(
                "Will the Fed cut rates in March?",
                "kalshi",
                Category::Economics,
            ),
            candidate(
                "Will the Fed cut rates in April?",
                "kalshi",
                Category::Economics,
            ),
        ];
        let map = matcher.cluster(&candidates);
        assert_ne!(
            map.resolve("Will the Fed cut rates in March?"),
            map.resolve("Will the Fed cut rates in April?")
        );
    }

    #[test]
    fn disjoint_years_never_merge_even_if_titles_are_similar() {
        let matcher = Matcher::new();
        let candidates = vec![
            candidate(
                "Who will win the 2028 election?",
                "polymarket",
                Category::Politics,
            ),
            candidate(
                "Who will win the 2032 election?",
                "kalshi",
                Category::Politics,
            ),
        ];
        let map = matcher.cluster(&candidates);
        assert_ne!(
            map.resolve("Who will win the 2028 election?"),
            map.resolve("Who will win the 2032 election?")
        );
    }

    #[test]
    fn candidacy_vs_outcome_conflict_keeps_markets_distinct() {
        let matcher = Matcher::new();
        let candidates = vec![
            candidate(
                "Will Jane Doe run for Ohio Senate in 2028?",
                "polymarket",
                Category::Politics,
            ),
            candidate(
                "Will Jane Doe win Ohio Senate in 2028?",
                "kalshi",
                Category::Politics,
            ),
        ];
        let map = matcher.cluster(&candidates);
        assert_ne!(
            map.resolve("Will Jane Doe run for Ohio Senate in 2028?"),
            map.resolve("Will Jane Doe win Ohio Senate in 2028?")
        );
    }

    #[test]
    fn aggregate_phrase_conflict_keeps_markets_distinct() {
        let matcher = Matcher::new();
        let candidates = vec![
            candidate(
                "Which party will control Ohio Senate in 2028?",
                "polymarket",
                Category::Politics,
            ),
            candidate(
                "Will Jane Doe win Ohio Senate in 2028?",
                "kalshi",
                Category::Politics,
            ),
        ];
        let map = matcher.cluster(&candidates);
        assert_ne!(
            map.resolve("Which party will control Ohio Senate in 2028?"),
            map.resolve("Will Jane Doe win Ohio Senate in 2028?")
        );
    }
}

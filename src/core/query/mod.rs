//! Assembles the read-side response the excluded read-API collaborator would
//! serve: live cache entries grouped by canonical title, filtered by
//! category, deduplicated within a venue, sorted by venue coverage.
//!
//! This is a library-level operation, not an HTTP surface — the read API
//! itself stays an external collaborator per the scope this crate covers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::core::domain::{Category, LiveCacheEntry};
use crate::core::matcher::{Candidate, Matcher};
use crate::core::store::Cache;
use crate::error::Result;

/// One canonical title's assembled cross-venue view.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketGroup {
    pub canonical_title: String,
    pub category: Category,
    pub entries: Vec<LiveCacheEntry>,
}

impl MarketGroup {
    #[must_use]
    pub fn venue_coverage(&self) -> usize {
        self.entries.len()
    }
}

struct CacheEntryBox {
    key: Option<Category>,
    groups: Vec<MarketGroup>,
    computed_at: Instant,
}

/// Scans the live cache, groups by canonical title via the matcher, and
/// caches the assembled result for a short window keyed by the requested
/// category filter.
pub struct LiveQueryAssembler {
    cache: Arc<dyn Cache>,
    matcher: Matcher,
    ttl: Duration,
    cached: Mutex<Option<CacheEntryBox>>,
}

impl LiveQueryAssembler {
    #[must_use]
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            cache,
            matcher: Matcher::new(),
            ttl,
            cached: Mutex::new(None),
        }
    }

    /// Assemble (or return the cached assembly of) every live market,
    /// optionally filtered to one category.
    ///
    /// # Errors
    /// Returns an error if the underlying cache scan fails.
    pub async fn assemble(&self, category: Option<Category>) -> Result<Vec<MarketGroup>> {
        {
            let guard = self.cached.lock();
            if let Some(cached) = guard.as_ref() {
                if cached.key == category && cached.computed_at.elapsed() < self.ttl {
                    return Ok(cached.groups.clone());
                }
            }
        }

        let all_entries = self.cache.scan_live().await?;
        let filtered: Vec<LiveCacheEntry> = match category {
            Some(category) => all_entries.into_iter().filter(|e| e.category == category).collect(),
            None => all_entries,
        };

        let candidates: Vec<Candidate> = filtered
            .iter()
            .map(|entry| Candidate {
                title: entry.title.clone(),
                venue_slug: entry.venue_slug.clone(),
                category: Some(entry.category),
            })
            .collect();
        let canonical_map = self.matcher.cluster(&candidates);

        let mut by_canonical: HashMap<String, Vec<LiveCacheEntry>> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for entry in filtered {
            let canonical = canonical_map.resolve(&entry.title).to_string();
            if !by_canonical.contains_key(&canonical) {
                order.push(canonical.clone());
            }
            by_canonical.entry(canonical).or_default().push(entry);
        }

        let mut groups: Vec<MarketGroup> = order
            .into_iter()
            .map(|canonical| {
                let mut entries = by_canonical.remove(&canonical).unwrap_or_default();
                dedupe_same_venue_keeping_freshest(&mut entries);
                let group_category = entries.first().map_or(Category::Culture, |e| e.category);
                MarketGroup {
                    canonical_title: canonical,
                    category: group_category,
                    entries,
                }
            })
            .collect();

        groups.sort_by(|a, b| b.venue_coverage().cmp(&a.venue_coverage()));

        *self.cached.lock() = Some(CacheEntryBox {
            key: category,
            groups: groups.clone(),
            computed_at: Instant::now(),
        });

        Ok(groups)
    }
}

/// Within one canonical group, keep only the freshest entry per venue.
fn dedupe_same_venue_keeping_freshest(entries: &mut Vec<LiveCacheEntry>) {
    let mut freshest: HashMap<String, LiveCacheEntry> = HashMap::new();
    for entry in entries.drain(..) {
        freshest
            .entry(entry.venue_slug.clone())
            .and_modify(|existing| {
                if entry.updated_at > existing.updated_at {
                    *existing = entry.clone();
                }
            })
            .or_insert(entry);
    }
    entries.extend(freshest.into_values());
}

//! A TTL'd cache in front of [`super::Matcher`].
//!
//! Reclustering every candidate on every engine cycle is wasted work when
//! the set of open markets barely moves between cycles. [`MatcherCache`]
//! keeps the most recent [`CanonicalTitleMap`] and only reruns
//! [`Matcher::cluster`] once its TTL has elapsed.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::core::domain::CanonicalTitleMap;

use super::{Candidate, Matcher};

struct Entry {
    map: CanonicalTitleMap,
    computed_at: Instant,
}

/// Thread-safe, interior-mutable wrapper around a [`Matcher`] plus its most
/// recent result.
pub struct MatcherCache {
    matcher: Matcher,
    ttl: Duration,
    entry: Mutex<Option<Entry>>,
}

impl MatcherCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            matcher: Matcher::new(),
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Return the cached map if still within its TTL, otherwise recluster
    /// `candidates` and cache the fresh result.
    pub fn resolve(&self, candidates: &[Candidate]) -> CanonicalTitleMap {
        let mut guard = self.entry.lock();
        if let Some(entry) = guard.as_ref() {
            if entry.computed_at.elapsed() < self.ttl {
                return entry.map.clone();
            }
        }
        let map = self.matcher.cluster(candidates);
        *guard = Some(Entry {
            map: map.clone(),
            computed_at: Instant::now(),
        });
        map
    }

    /// Force the next [`resolve`](Self::resolve) call to recluster,
    /// regardless of TTL. Used when configuration changes invalidate any
    /// cached clustering (e.g. a venue is disabled mid-run).
    pub fn invalidate(&self) {
        *self.entry.lock() = None;
    }
}

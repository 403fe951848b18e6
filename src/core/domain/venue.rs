//! Venue identity.
//!
//! Venues are a closed enumeration known at configuration time: each
//! deployment declares its set of venues up front. A venue is not
//! necessarily one worker — the sportsbook aggregator worker polls a single
//! upstream API but emits quotes tagged with the *bookmaker* venue slug
//! (e.g. `draftkings`), not its own.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The class of a venue, used by the matcher's category gate and by workers
/// that fall back to a venue's primary domain when classifying a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueClass {
    Prediction,
    Sports,
    Crypto,
}

/// A symbolic venue identifier plus its class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Venue {
    slug: String,
    class: VenueClass,
}

impl Venue {
    /// Create a new venue. `slug` is expected to already be a lower-case
    /// identifier; callers that accept external input should normalise it.
    pub fn new(slug: impl Into<String>, class: VenueClass) -> Self {
        Self {
            slug: slug.into(),
            class,
        }
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub const fn class(&self) -> VenueClass {
        self.class
    }
}

/// The closed set of venues known to this deployment, built once from
/// configuration at startup and shared read-only across all tasks.
#[derive(Debug, Clone, Default)]
pub struct VenueRegistry {
    venues: HashMap<String, Venue>,
}

impl VenueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a venue under its own slug. Later registrations for the
    /// same slug replace earlier ones.
    pub fn register(&mut self, venue: Venue) {
        self.venues.insert(venue.slug().to_string(), venue);
    }

    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&Venue> {
        self.venues.get(slug)
    }

    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        self.venues.contains_key(slug)
    }

    #[must_use]
    pub fn class_of(&self, slug: &str) -> Option<VenueClass> {
        self.get(slug).map(Venue::class)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Venue> {
        self.venues.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.venues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }
}

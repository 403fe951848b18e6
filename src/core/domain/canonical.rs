//! The canonical-title map: raw title -> cluster representative.
//!
//! The map is a function — every raw title maps to exactly one
//! representative, and the representative maps to itself. The
//! "representative maps to itself" edge is a reflexive self-edge, not a
//! cycle; it is stored explicitly so lookups never need to chase a chain.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalTitleMap {
    representative: HashMap<String, String>,
}

impl CanonicalTitleMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `title` belongs to the cluster represented by
    /// `canonical`. Also ensures `canonical` maps to itself.
    pub fn insert(&mut self, title: impl Into<String>, canonical: impl Into<String>) {
        let canonical = canonical.into();
        self.representative
            .entry(canonical.clone())
            .or_insert_with(|| canonical.clone());
        self.representative.insert(title.into(), canonical);
    }

    /// Resolve a raw title to its canonical representative. Titles never
    /// seen by the matcher resolve to themselves, matching the matcher's
    /// "no cluster found -> singleton cluster" behaviour.
    #[must_use]
    pub fn resolve<'a>(&'a self, title: &'a str) -> &'a str {
        self.representative
            .get(title)
            .map(String::as_str)
            .unwrap_or(title)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.representative.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.representative.is_empty()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.representative.keys().map(String::as_str)
    }

    /// Check well-definedness: for every known title,
    /// `resolve(resolve(title)) == resolve(title)`.
    #[must_use]
    pub fn is_well_defined(&self) -> bool {
        self.representative
            .keys()
            .all(|t| self.resolve(self.resolve(t)) == self.resolve(t))
    }
}

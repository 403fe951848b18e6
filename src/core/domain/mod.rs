//! Core domain types for the ingestion-to-arbitrage pipeline.
//!
//! ## Venue & category
//!
//! - [`Venue`] / [`VenueClass`] — closed, configuration-time venue identity
//! - [`Category`] — the closed OddsAxiom category taxonomy
//!
//! ## Quotes
//!
//! - [`RawQuote`] — a single outcome quote as extracted by a worker
//! - [`NormalisedQuote`] — a `RawQuote` plus implied probability
//! - [`PriceFormat`] — the venue-native price encoding
//! - [`OutcomeKind`] — binary-outcome classification (`Yes`/`No`/`Other`)
//! - [`OutcomeRef`] — `{name, index}` entry of a market's outcome list
//!
//! ## Live cache
//!
//! - [`LiveCacheEntry`] / [`OutcomeSnapshot`] — the aggregated per-market
//!   cache row
//!
//! ## Matching
//!
//! - [`CanonicalTitleMap`] — raw title -> cluster representative
//!
//! ## Arbitrage
//!
//! - [`Opportunity`] / [`OpportunityLeg`] — a detected cross-venue arbitrage
//!
//! ## Durable history
//!
//! - [`OddsSnapshot`] — one durable history row

mod canonical;
mod category;
mod live_cache;
mod opportunity;
mod quote;
mod snapshot;
mod venue;

pub use canonical::CanonicalTitleMap;
pub use category::Category;
pub use live_cache::{LiveCacheEntry, OutcomeSnapshot};
pub use opportunity::{Opportunity, OpportunityLeg};
pub use quote::{NormalisedQuote, OutcomeKind, OutcomeRef, PriceFormat, RawQuote};
pub use snapshot::OddsSnapshot;
pub use venue::{Venue, VenueClass, VenueRegistry};

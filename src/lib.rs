//! OddsAxiom core — ingestion-to-arbitrage pipeline for prediction-market,
//! sports-book, and crypto-event venues.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── core/              # Reusable library components
//! │   ├── domain/        # Quote/opportunity/venue types, pure
//! │   ├── normalise/      # Price-format -> implied probability
//! │   ├── matcher/        # Cross-venue title clustering
//! │   ├── workers/        # Venue-specific polling adapters
//! │   ├── publish/        # Live cache + ordered log + change notice
//! │   ├── engine/         # Consumer/detector subtasks, opportunity math
//! │   ├── store/          # Cache, ordered log, durable store abstractions
//! │   ├── snapshot/       # Periodic durable capture + retention pruning
//! │   └── query/          # Read-side live-cache assembler
//! ├── app/                # Configuration + task orchestration
//! └── cli/                # Command-line entrypoint
//! ```
//!
//! The surface layers described in the source system (auth sync, billing,
//! affiliate tracking, admin CRUD, the read API itself) are external
//! collaborators and are not part of this crate.

pub mod app;
pub mod cli;
pub mod core;
pub mod error;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

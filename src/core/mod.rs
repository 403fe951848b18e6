//! Core library components.

pub mod domain;
pub mod engine;
pub mod matcher;
pub mod normalise;
pub mod publish;
pub mod query;
pub mod snapshot;
pub mod store;
pub mod workers;

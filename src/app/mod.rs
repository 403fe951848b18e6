//! Process-wide wiring: configuration, logging, shared state, and the
//! startup/shutdown orchestrator.
//!
//! Nothing under `core/` knows about any of this — every task is handed its
//! collaborators (store handles, a `Publisher`, an `EngineConfig`, ...)
//! explicitly by [`orchestrator::run`] rather than reaching for an ambient
//! singleton, per §9's "pass handles explicitly into tasks" guidance.

pub mod config;
pub mod logging;
pub mod orchestrator;
pub mod state;

pub use config::Config;
pub use state::AppState;

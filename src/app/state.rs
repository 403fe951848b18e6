//! Shared process handles, built once at startup and passed explicitly into
//! every spawned task rather than reached for as an ambient singleton.

use std::sync::Arc;

use crate::core::publish::Publisher;
use crate::core::query::LiveQueryAssembler;
use crate::core::store::{Broadcaster, Cache, DurableStore, OpportunityStore, OrderedLog};

/// Every store handle and derived collaborator the orchestrator's tasks
/// share. Constructed once in [`super::orchestrator::build_state`] and
/// cloned (cheaply — every field is an `Arc`) into each task.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn Cache>,
    pub ordered_log: Arc<dyn OrderedLog>,
    pub broadcaster: Arc<dyn Broadcaster>,
    pub opportunity_store: Arc<dyn OpportunityStore>,
    pub durable_store: Arc<dyn DurableStore>,
    pub publisher: Arc<Publisher>,
    pub live_query: Arc<LiveQueryAssembler>,
}

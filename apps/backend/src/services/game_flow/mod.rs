//! Game flow orchestration - the one place a live session is mutated.
//!
//! Every human action, AI decision, and timer goes through `run_mutation`
//! while holding the session lock. AI thinking happens with the lock
//! released; a decision is only applied if the state has not moved since the
//! AI looked at it.

mod ai_coordinator;
mod mutation;
mod player_actions;
mod round_lifecycle;

use std::sync::Arc;

use crate::ai::AiConfig;
use crate::services::event_hub::EventHub;
use crate::services::registry::SessionRegistry;

pub use mutation::GameFlowMutationResult;

/// Cheap to clone; clones share the registry and the hub.
#[derive(Clone, Default)]
pub struct GameFlowService {
    registry: Arc<SessionRegistry>,
    hub: Arc<EventHub>,
    ai_config: AiConfig,
}

impl GameFlowService {
    pub fn new(ai_config: AiConfig) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            hub: Arc::new(EventHub::new()),
            ai_config,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn hub(&self) -> &Arc<EventHub> {
        &self.hub
    }
}

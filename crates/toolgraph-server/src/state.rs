//! Application State

use std::sync::Arc;

use toolgraph_core::Agent;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Agent shared by every request; each query still gets its own
    /// conversation state
    pub agent: Arc<Agent>,
}

impl AppState {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent: Arc::new(agent),
        }
    }
}

//! Application State

use std::sync::Arc;

use agent_core::{Agent, LlmProvider, RunConfig};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator with every specialist attached
    pub orchestrator: Arc<Agent>,

    /// Settings applied to every turn
    pub run_config: Arc<RunConfig>,

    /// Provider behind the orchestrator, for health checks
    pub provider: Arc<dyn LlmProvider>,
}

impl AppState {
    pub fn new(orchestrator: Agent, run_config: RunConfig) -> Self {
        let provider = Arc::clone(&orchestrator.model().provider);
        Self {
            orchestrator: Arc::new(orchestrator),
            run_config: Arc::new(run_config),
            provider,
        }
    }

    /// Model identifier turns are answered with
    pub fn model(&self) -> &str {
        self.run_config
            .model
            .as_ref()
            .unwrap_or_else(|| self.orchestrator.model())
            .model()
    }
}

//! Shared application state.

use std::sync::Arc;

use quizhub_session::SessionOrchestrator;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Operation surface for play sessions.
    pub orchestrator: Arc<SessionOrchestrator>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(orchestrator: Arc<SessionOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

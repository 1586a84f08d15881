//! Shared application state for the rewards API server.

use std::sync::Arc;

use praxis_engine::{Clock, RewardsService};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// clock is the same instance driving the service, so date defaults in
/// handlers agree with the engine's calendar.
#[derive(Clone)]
pub struct AppState {
    /// The progression and rewards service.
    pub service: RewardsService,
    /// Server-local time source.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create application state over a constructed service.
    pub fn new(service: RewardsService, clock: Arc<dyn Clock>) -> Self {
        Self { service, clock }
    }
}

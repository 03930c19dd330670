//! API shared state

use std::sync::Arc;

use crate::metrics::Metrics;
use crate::storage::ScoreBackend;

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Backend selected at startup
    pub backend: Arc<dyn ScoreBackend>,

    /// Process-wide metrics registry
    pub metrics: Arc<Metrics>,
}

impl ApiState {
    pub fn new(backend: Arc<dyn ScoreBackend>, metrics: Arc<Metrics>) -> Self {
        Self { backend, metrics }
    }
}

//! Application state for the API server

use crate::ConversionService;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The conversion pipeline
    pub service: Arc<ConversionService>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service: Arc<ConversionService>) -> Self {
        Self { service }
    }
}

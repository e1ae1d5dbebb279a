//! Application state shared across handlers

use std::sync::Arc;

use application::SearchService;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Place search pipeline
    pub search_service: Arc<SearchService>,
}

impl AppState {
    /// Wrap a search service for sharing between handlers
    #[must_use]
    pub fn new(search_service: SearchService) -> Self {
        Self {
            search_service: Arc::new(search_service),
        }
    }
}

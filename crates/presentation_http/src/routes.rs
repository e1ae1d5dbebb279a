//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        // Places API (v1)
        .route("/v1/places/search", post(handlers::places::search_places))
        .route("/v1/places/reverse", get(handlers::places::reverse_geocode))
        .with_state(state)
}

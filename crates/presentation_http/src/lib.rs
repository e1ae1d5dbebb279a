//! PlaceFinder HTTP presentation layer
//!
//! JSON API over the place search pipeline.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorResponse, set_expose_internal_errors};
pub use middleware::{ValidatedJson, ValidationError};
pub use routes::create_router;
pub use state::AppState;

//! Application layer - Use cases and orchestration
//!
//! Turns a [`domain::SearchQuery`] into a [`domain::SearchResult`]: resolve
//! the center, interpret the category, query the spatial backend, normalize,
//! enrich and sort. External services are reached only through the ports.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;

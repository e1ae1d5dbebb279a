//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports on top of `integration_osm`, loads
//! configuration and installs the tracing subscriber.

pub mod adapters;
pub mod bootstrap;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use bootstrap::build_search_service;
pub use config::{AppConfig, ServerConfig};
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};

//! Tracing subscriber setup
//!
//! Installs an `EnvFilter` plus a text or JSON formatter. `RUST_LOG` wins over
//! the configured filter when set.

mod subscriber;

pub use subscriber::{TelemetryConfig, TelemetryError, init_telemetry};

//! Application configuration
//!
//! Sections:
//! - `server`: HTTP server settings
//! - `nominatim`: geocoding client
//! - `overpass`: spatial query client
//! - `search`: search pipeline tuning
//! - `telemetry`: log filter and format
//!
//! Values come from built-in defaults, then an optional `config.toml`, then
//! `PLACEFINDER_*` environment variables (`__` separates nested keys, e.g.
//! `PLACEFINDER_SEARCH__DEFAULT_RADIUS_METERS=2000`).

mod server;

use std::path::Path;

use application::SearchConfig;
use config::ConfigError;
use integration_osm::{NominatimConfig, OverpassConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use server::ServerConfig;

use crate::telemetry::TelemetryConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "PLACEFINDER";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Nominatim geocoding configuration
    #[serde(default)]
    pub nominatim: NominatimConfig,

    /// Overpass configuration
    #[serde(default)]
    pub overpass: OverpassConfig,

    /// Search pipeline configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load from `config.toml` in the working directory (if present) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(
            config::File::with_name("config").required(false),
            Self::environment(),
        )
    }

    /// Load from an explicit file (which must exist) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, a source cannot be parsed or
    /// the result is invalid.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_sources(
            config::File::from(path.as_ref()).required(true),
            Self::environment(),
        )
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("server.allowed_origins")
            .with_list_parse_key("search.country_suffixes")
    }

    fn from_sources(
        file: impl config::Source + Send + Sync + 'static,
        env: config::Environment,
    ) -> Result<Self, ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        debug!(
            nominatim = %config.nominatim.base_url,
            overpass = %config.overpass.base_url,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Message`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Message(msg.to_string()));

        if self.nominatim.base_url.trim().is_empty() {
            return invalid("nominatim.base_url must not be empty");
        }
        if self.overpass.base_url.trim().is_empty() {
            return invalid("overpass.base_url must not be empty");
        }
        if self.nominatim.result_limit == 0 {
            return invalid("nominatim.result_limit must be at least 1");
        }
        if self.search.default_radius_meters == 0 {
            return invalid("search.default_radius_meters must be positive");
        }
        if self
            .search
            .max_radius_meters
            .is_some_and(|max| self.search.default_radius_meters > max)
        {
            return invalid("search.default_radius_meters must not exceed search.max_radius_meters");
        }
        if self.search.max_concurrency == 0 {
            return invalid("search.max_concurrency must be at least 1");
        }
        Ok(())
    }
}

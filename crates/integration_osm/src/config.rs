//! Overpass service configuration

use serde::{Deserialize, Serialize};

/// Configuration for the Overpass API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassConfig {
    /// Interpreter endpoint of the Overpass API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Server-side processing timeout hint embedded in every query
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u32,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_query_timeout_secs() -> u32 {
    25
}

pub(crate) fn default_user_agent() -> String {
    concat!(
        "PlaceFinder/",
        env!("CARGO_PKG_VERSION"),
        " (https://github.com/placefinder/placefinder)"
    )
    .to_string()
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            query_timeout_secs: default_query_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl OverpassConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            ..Default::default()
        }
    }
}

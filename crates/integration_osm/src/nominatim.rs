//! Nominatim geocoding client
//!
//! Converts free-form address strings to candidate coordinates and
//! coordinates back to addresses using the
//! [Nominatim](https://nominatim.openstreetmap.org) API (OpenStreetMap).
//!
//! Enforces the Nominatim usage policy: a descriptive user agent on every
//! request and a minimum interval between consecutive requests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::config::default_user_agent;
use crate::models::{GeocodeHit, ReverseHit};

/// Configuration for the Nominatim geocoding service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominatimConfig {
    /// Base URL for the Nominatim API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout_secs")]
    pub timeout_secs: u64,

    /// Country code filter for regional lookups (e.g., "es" for Spain)
    #[serde(default = "default_country_filter")]
    pub country_filter: String,

    /// Preferred response language (`accept-language`)
    #[serde(default = "default_language")]
    pub language: String,

    /// Maximum number of forward geocoding candidates per lookup
    #[serde(default = "default_result_limit")]
    pub result_limit: u8,

    /// Minimum spacing between requests in milliseconds (0 disables)
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,

    /// User agent identifying this application
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

const fn default_geocoding_timeout_secs() -> u64 {
    10
}

fn default_country_filter() -> String {
    "es".to_string()
}

fn default_language() -> String {
    "es".to_string()
}

const fn default_result_limit() -> u8 {
    5
}

const fn default_min_request_interval_ms() -> u64 {
    1000
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            timeout_secs: default_geocoding_timeout_secs(),
            country_filter: default_country_filter(),
            language: default_language(),
            result_limit: default_result_limit(),
            min_request_interval_ms: default_min_request_interval_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl NominatimConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            min_request_interval_ms: 0,
            ..Default::default()
        }
    }

    /// Minimum spacing between requests
    #[must_use]
    pub const fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }
}

/// Errors that can occur during geocoding
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// Connection to geocoding service failed
    #[error("Geocoding connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to geocoding service failed
    #[error("Geocoding request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse geocoding response
    #[error("Geocoding parse error: {0}")]
    ParseError(String),

    /// Address could not be resolved
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    /// Request timeout
    #[error("Geocoding request timed out")]
    Timeout,
}

/// Trait for geocoding clients
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Look up candidates for a free-form address
    ///
    /// `country_codes` restricts results to the given ISO 3166-1 codes;
    /// `None` searches worldwide.
    async fn search(
        &self,
        query: &str,
        country_codes: Option<&str>,
    ) -> Result<Vec<GeocodeHit>, GeocodingError>;

    /// Convert coordinates to a structured address
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ReverseHit, GeocodingError>;
}

/// Nominatim-based geocoding client with request spacing
#[derive(Debug)]
pub struct NominatimGeocodingClient {
    client: Client,
    config: NominatimConfig,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl NominatimGeocodingClient {
    /// Create a new Nominatim geocoding client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &NominatimConfig) -> Result<Self, GeocodingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodingError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
            last_request: Arc::new(Mutex::new(None)),
        })
    }

    /// Enforce the configured minimum spacing between requests
    async fn rate_limit(&self) {
        let interval = self.config.min_request_interval();
        if interval.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                let wait = interval.saturating_sub(elapsed);
                debug!(?wait, "Rate limiting geocoding request");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<String, GeocodingError> {
        self.rate_limit().await;

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodingError::Timeout
                } else {
                    GeocodingError::ConnectionFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(GeocodingError::RequestFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                GeocodingError::Timeout
            } else {
                GeocodingError::ParseError(e.to_string())
            }
        })
    }

    /// Parse a `/search` response body into typed hits
    ///
    /// Hits with unparseable coordinates are skipped.
    fn parse_search_response(body: &str) -> Result<Vec<GeocodeHit>, GeocodingError> {
        let results: Vec<NominatimResult> =
            serde_json::from_str(body).map_err(|e| GeocodingError::ParseError(e.to_string()))?;

        Ok(results
            .into_iter()
            .filter_map(|raw| {
                let latitude = raw.lat.parse::<f64>().ok()?;
                let longitude = raw.lon.parse::<f64>().ok()?;
                Some(GeocodeHit {
                    latitude,
                    longitude,
                    display_name: raw.display_name.unwrap_or_default(),
                    address: raw.address.unwrap_or_default(),
                })
            })
            .collect())
    }

    /// Parse a `/reverse` response body
    fn parse_reverse_response(
        body: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<ReverseHit, GeocodingError> {
        let result: NominatimReverseResult =
            serde_json::from_str(body).map_err(|e| GeocodingError::ParseError(e.to_string()))?;

        if let Some(error) = result.error {
            debug!(%error, "Nominatim reverse lookup returned no address");
            return Err(GeocodingError::AddressNotFound(format!(
                "{latitude},{longitude}"
            )));
        }

        Ok(ReverseHit {
            display_name: result.display_name,
            address: result.address.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl GeocodingClient for NominatimGeocodingClient {
    #[instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        country_codes: Option<&str>,
    ) -> Result<Vec<GeocodeHit>, GeocodingError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodingError::AddressNotFound(
                "Address must not be empty".to_string(),
            ));
        }

        let url = format!("{}/search", self.config.base_url);
        let mut params = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("limit", self.config.result_limit.to_string()),
            ("addressdetails", "1".to_string()),
            ("accept-language", self.config.language.clone()),
        ];

        if let Some(codes) = country_codes.filter(|c| !c.is_empty()) {
            params.push(("countrycodes", codes.to_string()));
        }

        debug!(%query, ?country_codes, "Geocoding address");

        let body = self.get(&url, &params).await?;
        let hits = Self::parse_search_response(&body)?;

        debug!(%query, count = hits.len(), "Geocoding candidates received");
        Ok(hits)
    }

    #[instrument(skip(self))]
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ReverseHit, GeocodingError> {
        let url = format!("{}/reverse", self.config.base_url);
        let params = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
            ("accept-language", self.config.language.clone()),
        ];

        debug!(%latitude, %longitude, "Reverse geocoding");

        let body = self.get(&url, &params).await?;
        Self::parse_reverse_response(&body, latitude, longitude)
    }
}

/// Raw Nominatim `/search` entry
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: Option<String>,
    address: Option<BTreeMap<String, String>>,
}

/// Raw Nominatim `/reverse` response
#[derive(Debug, Deserialize)]
struct NominatimReverseResult {
    display_name: Option<String>,
    address: Option<BTreeMap<String, String>>,
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominatim_config_default() {
        let config = NominatimConfig::default();
        assert_eq!(config.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.country_filter, "es");
        assert_eq!(config.language, "es");
        assert_eq!(config.result_limit, 5);
        assert_eq!(config.min_request_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_nominatim_config_for_testing() {
        let config = NominatimConfig::for_testing();
        assert_eq!(config.timeout_secs, 5);
        assert!(config.min_request_interval().is_zero());
    }

    #[test]
    fn test_geocoding_error_display() {
        let err = GeocodingError::AddressNotFound("Calle Mayor".to_string());
        assert!(err.to_string().contains("Calle Mayor"));

        let err = GeocodingError::Timeout;
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_parse_search_response() {
        let json = r#"[
            {"lat": "40.4153", "lon": "-3.7074", "display_name": "Calle Mayor, Madrid, España",
             "address": {"road": "Calle Mayor", "city": "Madrid"}},
            {"lat": "not-a-number", "lon": "-3.7", "display_name": "Broken"}
        ]"#;
        let hits = NominatimGeocodingClient::parse_search_response(json).unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].latitude - 40.4153).abs() < 1e-9);
        assert_eq!(hits[0].display_name, "Calle Mayor, Madrid, España");
        assert_eq!(hits[0].address.get("city").map(String::as_str), Some("Madrid"));
    }

    #[test]
    fn test_parse_empty_search_response() {
        let hits = NominatimGeocodingClient::parse_search_response("[]").unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_parse_invalid_search_response() {
        let result = NominatimGeocodingClient::parse_search_response("<html>");
        assert!(matches!(result, Err(GeocodingError::ParseError(_))));
    }

    #[test]
    fn test_parse_reverse_response() {
        let json = r#"{
            "display_name": "5, Calle Mayor, Sol, Madrid, 28013, España",
            "address": {"house_number": "5", "road": "Calle Mayor", "city": "Madrid"}
        }"#;
        let hit = NominatimGeocodingClient::parse_reverse_response(json, 40.0, -3.0).unwrap();
        assert_eq!(
            hit.display_name.as_deref(),
            Some("5, Calle Mayor, Sol, Madrid, 28013, España")
        );
        assert_eq!(hit.address.get("road").map(String::as_str), Some("Calle Mayor"));
    }

    #[test]
    fn test_parse_reverse_error_response() {
        let json = r#"{"error": "Unable to geocode"}"#;
        let result = NominatimGeocodingClient::parse_reverse_response(json, 0.0, 0.0);
        assert!(matches!(result, Err(GeocodingError::AddressNotFound(_))));
    }

    #[test]
    fn test_nominatim_config_serialization() {
        let config = NominatimConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: NominatimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.base_url, config.base_url);
        assert_eq!(deserialized.country_filter, config.country_filter);
    }

    #[tokio::test]
    async fn test_rate_limit_spaces_requests() {
        let config = NominatimConfig {
            min_request_interval_ms: 50,
            ..NominatimConfig::for_testing()
        };
        let client = NominatimGeocodingClient::new(&config).unwrap();

        let start = Instant::now();
        client.rate_limit().await;
        client.rate_limit().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}

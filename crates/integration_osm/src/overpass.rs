//! Overpass API client
//!
//! Executes Overpass QL queries and parses the `[out:json]` response.
//! Individual malformed elements are dropped rather than failing the
//! whole response.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::OverpassConfig;
use crate::error::OverpassError;
use crate::models::{OverpassElement, OverpassResponse};

/// Trait for Overpass clients
#[async_trait]
pub trait OverpassClient: Send + Sync {
    /// Execute an Overpass QL query
    async fn execute(&self, query: &str) -> Result<OverpassResponse, OverpassError>;
}

/// HTTP client for a public or self-hosted Overpass interpreter
#[derive(Debug)]
pub struct HttpOverpassClient {
    client: Client,
    config: OverpassConfig,
}

impl HttpOverpassClient {
    /// Create a new Overpass client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &OverpassConfig) -> Result<Self, OverpassError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| OverpassError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// The configuration this client was built with
    #[must_use]
    pub const fn config(&self) -> &OverpassConfig {
        &self.config
    }

    fn map_status(status: StatusCode, retry_after: Option<u64>) -> OverpassError {
        match status {
            StatusCode::TOO_MANY_REQUESTS => OverpassError::RateLimitExceeded {
                retry_after_secs: retry_after,
            },
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                OverpassError::ServiceUnavailable(format!("HTTP {status}"))
            },
            _ => OverpassError::RequestFailed(format!("HTTP {status}")),
        }
    }

    /// Parse a response body, skipping elements that do not match the schema
    pub(crate) fn parse_response(body: &str) -> Result<OverpassResponse, OverpassError> {
        let root: Value =
            serde_json::from_str(body).map_err(|e| OverpassError::ParseError(e.to_string()))?;

        let Some(object) = root.as_object() else {
            return Err(OverpassError::ParseError(
                "expected a JSON object".to_string(),
            ));
        };

        let remark = object
            .get("remark")
            .and_then(Value::as_str)
            .map(ToString::to_string);

        let raw_elements = match object.get("elements") {
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => {
                return Err(OverpassError::ParseError(
                    "`elements` is not an array".to_string(),
                ));
            },
            None => &[],
        };

        let mut skipped = 0usize;
        let elements: Vec<OverpassElement> = raw_elements
            .iter()
            .filter_map(|item| {
                serde_json::from_value::<OverpassElement>(item.clone())
                    .map_err(|_| skipped += 1)
                    .ok()
            })
            .collect();

        if skipped > 0 {
            warn!(skipped, "Dropped malformed Overpass elements");
        }

        Ok(OverpassResponse { elements, remark })
    }
}

#[async_trait]
impl OverpassClient for HttpOverpassClient {
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    async fn execute(&self, query: &str) -> Result<OverpassResponse, OverpassError> {
        if query.trim().is_empty() {
            return Err(OverpassError::InvalidQuery(
                "Query must not be empty".to_string(),
            ));
        }

        debug!(url = %self.config.base_url, "Executing Overpass query");

        let response = self
            .client
            .post(&self.config.base_url)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OverpassError::Timeout {
                        timeout_secs: self.config.timeout_secs,
                    }
                } else {
                    OverpassError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            warn!(%status, "Overpass request rejected");
            return Err(Self::map_status(status, retry_after));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                OverpassError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                }
            } else {
                OverpassError::ParseError(e.to_string())
            }
        })?;

        let parsed = Self::parse_response(&body)?;
        debug!(count = parsed.elements.len(), "Overpass elements received");
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_with_mixed_elements() {
        let body = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 40.41, "lon": -3.70, "tags": {"amenity": "cafe"}},
                {"type": "way", "id": 2, "center": {"lat": 40.42, "lon": -3.71}},
                {"type": "node", "lat": 40.0},
                "garbage"
            ]
        }"#;
        let parsed = HttpOverpassClient::parse_response(body).unwrap();
        assert_eq!(parsed.elements.len(), 2);
        assert_eq!(parsed.elements[0].id, 1);
        assert_eq!(parsed.elements[1].element_type, "way");
        assert!(parsed.elements[1].tags.is_empty());
        assert!(parsed.remark.is_none());
    }

    #[test]
    fn test_parse_response_with_remark() {
        let body = r#"{"elements": [], "remark": "runtime error: Query timed out"}"#;
        let parsed = HttpOverpassClient::parse_response(body).unwrap();
        assert!(parsed.elements.is_empty());
        assert_eq!(
            parsed.remark.as_deref(),
            Some("runtime error: Query timed out")
        );
    }

    #[test]
    fn test_parse_response_without_elements() {
        let parsed = HttpOverpassClient::parse_response("{}").unwrap();
        assert!(parsed.elements.is_empty());
    }

    #[test]
    fn test_parse_response_rejects_non_json() {
        let result = HttpOverpassClient::parse_response("<html>busy</html>");
        assert!(matches!(result, Err(OverpassError::ParseError(_))));
    }

    #[test]
    fn test_parse_response_rejects_non_array_elements() {
        let result = HttpOverpassClient::parse_response(r#"{"elements": 3}"#);
        assert!(matches!(result, Err(OverpassError::ParseError(_))));
    }

    #[test]
    fn test_map_status() {
        assert!(matches!(
            HttpOverpassClient::map_status(StatusCode::TOO_MANY_REQUESTS, Some(30)),
            OverpassError::RateLimitExceeded {
                retry_after_secs: Some(30)
            }
        ));
        assert!(matches!(
            HttpOverpassClient::map_status(StatusCode::GATEWAY_TIMEOUT, None),
            OverpassError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            HttpOverpassClient::map_status(StatusCode::BAD_REQUEST, None),
            OverpassError::RequestFailed(_)
        ));
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let client = HttpOverpassClient::new(&OverpassConfig::for_testing()).unwrap();
        let result = client.execute("   ").await;
        assert!(matches!(result, Err(OverpassError::InvalidQuery(_))));
    }
}

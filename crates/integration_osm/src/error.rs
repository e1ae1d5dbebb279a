//! Overpass error types

use thiserror::Error;

/// Errors that can occur while querying the Overpass API
#[derive(Debug, Error)]
pub enum OverpassError {
    /// Connection to the Overpass service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Overpass answered with a non-success status
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse the Overpass response body
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying (if provided by the server)
        retry_after_secs: Option<u64>,
    },

    /// Overpass is overloaded or the gateway timed out (HTTP 503/504)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The query was empty
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },
}

impl OverpassError {
    /// Returns true if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::RequestFailed(_)
                | Self::ServiceUnavailable(_)
                | Self::Timeout { .. }
                | Self::RateLimitExceeded { .. }
        )
    }

    /// Returns true if the server answered but the body could not be understood
    #[must_use]
    pub const fn is_malformed_response(&self) -> bool {
        matches!(self, Self::ParseError(_))
    }
}

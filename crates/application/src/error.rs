//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can terminate a search
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Neither coordinates nor location text were supplied
    #[error("A location is required: provide lat/lng or a location text")]
    MissingLocation,

    /// The query itself is unusable (empty category, zero radius, ...)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Every address variation was tried without a geocoding match
    #[error("Could not geocode the location after trying {attempts} variations")]
    GeocodingFailed {
        /// Number of variations attempted
        attempts: usize,
    },

    /// An upstream service failed or could not be reached
    #[error("Upstream service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// An upstream service answered with a body that could not be parsed
    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Check if a caller could reasonably retry the same request
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable(_))
    }

    /// Stable machine-readable code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Domain(_) | Self::InvalidQuery(_) => "bad_request",
            Self::MissingLocation => "missing_location",
            Self::GeocodingFailed { .. } => "geocoding_failed",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::MalformedUpstreamResponse(_) => "malformed_upstream_response",
            Self::Configuration(_) => "configuration_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_upstream_failures_are_retryable() {
        assert!(ApplicationError::UpstreamUnavailable("503".to_string()).is_retryable());
        assert!(!ApplicationError::MissingLocation.is_retryable());
        assert!(!ApplicationError::GeocodingFailed { attempts: 4 }.is_retryable());
        assert!(!ApplicationError::MalformedUpstreamResponse("eof".to_string()).is_retryable());
    }

    #[test]
    fn geocoding_failed_mentions_attempts() {
        let err = ApplicationError::GeocodingFailed { attempts: 6 };
        assert!(err.to_string().contains("6 variations"));
        assert_eq!(err.code(), "geocoding_failed");
    }

    #[test]
    fn domain_error_converts() {
        let err: ApplicationError = DomainError::invalid_coordinates(91.0, 0.0).into();
        assert!(matches!(err, ApplicationError::Domain(_)));
        assert_eq!(err.code(), "bad_request");
    }
}

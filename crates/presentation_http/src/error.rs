//! API error handling
//!
//! Maps application failures to status codes and a stable JSON body
//! `{ error, code, details? }`. Upstream and internal messages are only
//! exposed as `details` when enabled.

use std::sync::atomic::{AtomicBool, Ordering};

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Global flag to control error detail exposure
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

/// Configure whether upstream and internal error details are included in responses
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::SeqCst);
}

fn should_expose_details() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::SeqCst)
}

fn details(msg: &str) -> Option<String> {
    should_expose_details().then(|| msg.to_string())
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Missing location")]
    MissingLocation,

    #[error("Geocoding failed: {0}")]
    GeocodingFailed(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Additional error details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// HTTP status for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::MissingLocation => StatusCode::BAD_REQUEST,
            Self::GeocodingFailed(_) => StatusCode::NOT_FOUND,
            Self::UpstreamUnavailable(_) | Self::MalformedUpstreamResponse(_) => {
                StatusCode::BAD_GATEWAY
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::MissingLocation => "missing_location",
            Self::GeocodingFailed(_) => "geocoding_failed",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::MalformedUpstreamResponse(_) => "malformed_upstream_response",
            Self::Internal(_) => "internal_error",
        }
    }

    fn body(&self) -> ErrorResponse {
        let (error, details) = match self {
            Self::BadRequest(msg) | Self::GeocodingFailed(msg) => (msg.clone(), None),
            Self::MissingLocation => (
                "Provide either lat and lng or a location_text".to_string(),
                None,
            ),
            Self::UpstreamUnavailable(msg) => (
                "A map data service is unavailable, try again later".to_string(),
                details(msg),
            ),
            Self::MalformedUpstreamResponse(msg) => (
                "A map data service returned an unreadable response".to_string(),
                details(msg),
            ),
            Self::Internal(msg) => ("An internal error occurred".to_string(), details(msg)),
        };

        ErrorResponse {
            error,
            code: self.code().to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::warn!(code = self.code(), error = %self, "Request failed");
        }
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Domain(e) => Self::BadRequest(e.to_string()),
            ApplicationError::InvalidQuery(msg) => Self::BadRequest(msg),
            ApplicationError::MissingLocation => Self::MissingLocation,
            e @ ApplicationError::GeocodingFailed { .. } => Self::GeocodingFailed(e.to_string()),
            ApplicationError::UpstreamUnavailable(msg) => Self::UpstreamUnavailable(msg),
            ApplicationError::MalformedUpstreamResponse(msg) => {
                Self::MalformedUpstreamResponse(msg)
            },
            ApplicationError::Configuration(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_messages() {
        assert_eq!(
            ApiError::BadRequest("invalid input".to_string()).to_string(),
            "Bad request: invalid input"
        );
        assert_eq!(ApiError::MissingLocation.to_string(), "Missing location");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::MissingLocation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::GeocodingFailed(String::new()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::UpstreamUnavailable(String::new()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::MalformedUpstreamResponse(String::new()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Internal(String::new()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn application_errors_convert() {
        let cases = [
            (ApplicationError::MissingLocation, "missing_location"),
            (ApplicationError::InvalidQuery("empty".to_string()), "bad_request"),
            (ApplicationError::GeocodingFailed { attempts: 7 }, "geocoding_failed"),
            (
                ApplicationError::UpstreamUnavailable("504".to_string()),
                "upstream_unavailable",
            ),
            (
                ApplicationError::MalformedUpstreamResponse("eof".to_string()),
                "malformed_upstream_response",
            ),
            (ApplicationError::Configuration("bad url".to_string()), "internal_error"),
        ];
        for (source, code) in cases {
            assert_eq!(ApiError::from(source).code(), code);
        }
    }

    #[test]
    fn domain_errors_are_bad_requests() {
        let source = ApplicationError::Domain(domain::DomainError::InvalidCoordinates {
            latitude: 100.0,
            longitude: 0.0,
        });
        assert!(matches!(ApiError::from(source), ApiError::BadRequest(_)));
    }

    #[test]
    fn geocoding_failure_keeps_attempt_count() {
        let err = ApiError::from(ApplicationError::GeocodingFailed { attempts: 3 });
        assert_eq!(
            err.body().error,
            "Could not geocode the location after trying 3 variations"
        );
    }

    #[test]
    fn error_response_omits_empty_details() {
        let resp = ErrorResponse {
            error: "Bad request".to_string(),
            code: "bad_request".to_string(),
            details: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("code"));
        assert!(!json.contains("details"));
    }

    #[test]
    fn upstream_details_hidden_by_default() {
        let body = ApiError::UpstreamUnavailable("http://10.0.0.1/api refused".to_string()).body();
        assert_eq!(body.code, "upstream_unavailable");
        assert!(!body.error.contains("10.0.0.1"));
    }

    #[test]
    fn into_response_status() {
        let response = ApiError::GeocodingFailed("none".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

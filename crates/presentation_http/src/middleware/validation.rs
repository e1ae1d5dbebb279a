//! Request validation
//!
//! `ValidatedJson` deserializes a JSON body and runs its `validator` rules.
//! Both kinds of rejection answer `400` with the standard error body.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::error::ErrorResponse;

/// Validation error type
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] JsonRejection),
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            code: "bad_request".to_string(),
            details: None,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Render field errors as `field: message` pairs, sorted by field
fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                format!("{field}: {message}")
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// A JSON extractor that also validates the request body
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value
            .validate()
            .map_err(|e| ValidationError::ValidationFailed(describe(&e)))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, routing::post};
    use serde::Deserialize;
    use tower::ServiceExt;
    use validator::Validate;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct TestRequest {
        #[validate(length(min = 1, max = 20, message = "must be between 1 and 20 characters"))]
        query: String,
        #[validate(range(min = 1, max = 5000, message = "must be between 1 and 5000"))]
        #[serde(default = "default_radius")]
        radius_meters: u32,
    }

    const fn default_radius() -> u32 {
        1000
    }

    async fn test_handler(ValidatedJson(req): ValidatedJson<TestRequest>) -> String {
        format!("{} within {}", req.query, req.radius_meters)
    }

    async fn post_json(body: &'static str) -> Response {
        Router::new()
            .route("/test", post(test_handler))
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/test")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn valid_request_passes() {
        let response = post_json(r#"{"query": "cafe"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_query_rejected() {
        let response = post_json(r#"{"query": ""}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn radius_out_of_range_rejected() {
        let response = post_json(r#"{"query": "cafe", "radius_meters": 0}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_json_rejected() {
        let response = post_json(r#"{"query": not valid json}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn describe_sorts_fields() {
        let request = TestRequest {
            query: String::new(),
            radius_meters: 0,
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(
            describe(&errors),
            "query: must be between 1 and 20 characters; radius_meters: must be between 1 and 5000"
        );
    }
}

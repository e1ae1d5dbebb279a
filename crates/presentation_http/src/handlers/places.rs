//! Place search handlers

use axum::{
    Json,
    extract::{Query, State},
};
use domain::{SearchQuery, SearchResult};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::{error::ApiError, middleware::ValidatedJson, state::AppState};

/// Places listed in the human-readable summary
pub const SUMMARY_LIMIT: usize = 10;

/// Request body for a place search
#[derive(Debug, Deserialize, Validate)]
pub struct SearchRequest {
    /// Place type, e.g. "cafetería" or "museum"
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub query: String,

    /// Latitude of the search center
    #[validate(range(min = -90.0, max = 90.0, message = "must be between -90 and 90"))]
    #[serde(default)]
    pub lat: Option<f64>,

    /// Longitude of the search center
    #[validate(range(min = -180.0, max = 180.0, message = "must be between -180 and 180"))]
    #[serde(default)]
    pub lng: Option<f64>,

    /// Address used when coordinates are missing
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    #[serde(default)]
    pub location_text: Option<String>,

    /// Search radius in meters (server default when omitted)
    #[validate(range(min = 1, message = "must be positive"))]
    #[serde(default)]
    pub radius_meters: Option<u32>,
}

impl SearchRequest {
    fn into_query(self, default_radius: u32) -> SearchQuery {
        SearchQuery {
            query: self.query,
            lat: self.lat,
            lng: self.lng,
            location_text: self.location_text,
            radius_meters: self.radius_meters.unwrap_or(default_radius),
        }
    }
}

/// Search response: the result plus a text summary
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub result: SearchResult,
    /// Human-readable listing of the nearest places
    pub summary: String,
}

/// Find places of a type around coordinates or an address
#[instrument(skip(state, request), fields(query = %request.query))]
pub async fn search_places(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let default_radius = state.search_service.config().default_radius_meters;
    let result = state
        .search_service
        .search(request.into_query(default_radius))
        .await?;

    info!(count = result.count, "Search request served");
    Ok(Json(SearchResponse {
        summary: result.format_summary(SUMMARY_LIMIT),
        result,
    }))
}

/// Query parameters for reverse geocoding
#[derive(Debug, Deserialize)]
pub struct ReverseParams {
    pub lat: f64,
    pub lng: f64,
}

/// Reverse geocoding response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReverseResponse {
    pub lat: f64,
    pub lng: f64,
    /// Address at the point, if one is known
    pub address: Option<String>,
}

/// Describe the address at a point
#[instrument(skip(state))]
pub async fn reverse_geocode(
    State(state): State<AppState>,
    Query(params): Query<ReverseParams>,
) -> Result<Json<ReverseResponse>, ApiError> {
    let address = state
        .search_service
        .reverse_geocode(params.lat, params.lng)
        .await?;

    Ok(Json(ReverseResponse {
        lat: params.lat,
        lng: params.lng,
        address,
    }))
}

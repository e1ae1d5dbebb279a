//! Wiring of adapters into application services

use std::sync::Arc;

use application::ports::{GeocodingPort, SpatialQueryPort};
use application::{ApplicationError, SearchService};
use tracing::info;

use crate::adapters::{NominatimAdapter, OverpassAdapter};
use crate::config::AppConfig;

/// Build a [`SearchService`] backed by the configured OSM services
///
/// # Errors
///
/// Returns [`ApplicationError::Configuration`] if an HTTP client cannot be built.
pub fn build_search_service(config: &AppConfig) -> Result<SearchService, ApplicationError> {
    let geocoder: Arc<dyn GeocodingPort> = Arc::new(NominatimAdapter::new(&config.nominatim)?);
    let spatial: Arc<dyn SpatialQueryPort> = Arc::new(OverpassAdapter::new(&config.overpass)?);

    info!(
        nominatim = %config.nominatim.base_url,
        overpass = %config.overpass.base_url,
        combination = %config.search.predicate_combination,
        "Search service ready"
    );

    Ok(SearchService::new(geocoder, spatial, config.search.clone())
        .with_query_timeout_secs(config.overpass.query_timeout_secs)
        .with_global_fallback(has_region_restriction(config)))
}

/// Regional lookups differ from worldwide ones only with a country filter
fn has_region_restriction(config: &AppConfig) -> bool {
    !config.nominatim.country_filter.trim().is_empty()
}

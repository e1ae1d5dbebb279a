//! Overpass adapter - Implements SpatialQueryPort using integration_osm

use application::error::ApplicationError;
use application::ports::{RawFeature, SpatialQueryPort};
use application::services::SpatialQuery;
use async_trait::async_trait;
use domain::value_objects::GeoLocation;
use integration_osm::{HttpOverpassClient, OverpassClient, OverpassConfig, OverpassElement, OverpassError};
use tracing::{debug, instrument, warn};

const RUNTIME_ERROR_PREFIX: &str = "runtime error";

/// Adapter for radius queries against an Overpass interpreter
pub struct OverpassAdapter {
    client: Box<dyn OverpassClient>,
}

impl std::fmt::Debug for OverpassAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverpassAdapter")
            .field("client", &"OverpassClient")
            .finish()
    }
}

impl OverpassAdapter {
    /// Create an adapter backed by an HTTP Overpass client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: &OverpassConfig) -> Result<Self, ApplicationError> {
        let client = HttpOverpassClient::new(config)
            .map_err(|e| ApplicationError::Configuration(format!("Overpass client: {e}")))?;
        Ok(Self::with_client(client))
    }

    /// Create an adapter around an existing client
    pub fn with_client(client: impl OverpassClient + 'static) -> Self {
        Self {
            client: Box::new(client),
        }
    }
}

fn map_error(error: OverpassError) -> ApplicationError {
    if error.is_malformed_response() {
        return ApplicationError::MalformedUpstreamResponse(format!("Overpass: {error}"));
    }
    match error {
        OverpassError::InvalidQuery(msg) => ApplicationError::InvalidQuery(msg),
        other => ApplicationError::UpstreamUnavailable(format!("Overpass: {other}")),
    }
}

/// Whether a remark reports a failed query rather than a note
fn is_runtime_error(remark: &str) -> bool {
    remark
        .trim_start()
        .get(..RUNTIME_ERROR_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(RUNTIME_ERROR_PREFIX))
}

/// Convert a wire element, dropping out-of-range coordinates
fn to_raw_feature(element: OverpassElement) -> RawFeature {
    let to_location = |(lat, lon): (f64, f64)| GeoLocation::new(lat, lon).ok();
    RawFeature {
        coordinates: element.point().and_then(to_location),
        centroid: element.centroid().and_then(to_location),
        kind: element.element_type,
        id: element.id,
        tags: element.tags,
    }
}

#[async_trait]
impl SpatialQueryPort for OverpassAdapter {
    #[instrument(skip(self, query), fields(radius = query.radius_meters, clauses = query.clauses.len()))]
    async fn fetch(&self, query: &SpatialQuery) -> Result<Vec<RawFeature>, ApplicationError> {
        let ql = query.to_overpass_ql();
        debug!(%ql, "Executing Overpass query");

        let response = self.client.execute(&ql).await.map_err(map_error)?;
        if let Some(remark) = response.remark.as_deref() {
            // Overpass reports runtime errors here with a 200 and partial data
            if is_runtime_error(remark) && response.elements.is_empty() {
                return Err(ApplicationError::UpstreamUnavailable(format!(
                    "Overpass: {remark}"
                )));
            }
            warn!(%remark, "Overpass returned a remark");
        }

        debug!(count = response.elements.len(), "Overpass elements received");
        Ok(response.elements.into_iter().map(to_raw_feature).collect())
    }
}

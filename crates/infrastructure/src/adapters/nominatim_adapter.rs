//! Nominatim adapter - Implements GeocodingPort using integration_osm

use application::error::ApplicationError;
use application::ports::{GeocodeCandidate, GeocodeScope, GeocodingPort, ReverseGeocode};
use async_trait::async_trait;
use domain::value_objects::GeoLocation;
use integration_osm::{GeocodingClient, GeocodingError, NominatimConfig, NominatimGeocodingClient};
use tracing::{debug, instrument};

/// Adapter for forward and reverse geocoding via Nominatim
pub struct NominatimAdapter {
    client: Box<dyn GeocodingClient>,
    country_filter: String,
}

impl std::fmt::Debug for NominatimAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NominatimAdapter")
            .field("client", &"GeocodingClient")
            .field("country_filter", &self.country_filter)
            .finish()
    }
}

impl NominatimAdapter {
    /// Create an adapter backed by an HTTP Nominatim client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: &NominatimConfig) -> Result<Self, ApplicationError> {
        let client = NominatimGeocodingClient::new(config).map_err(|e| {
            ApplicationError::Configuration(format!("Nominatim client: {e}"))
        })?;
        Ok(Self::with_client(client, config.country_filter.clone()))
    }

    /// Create an adapter around an existing client
    ///
    /// `country_filter` is the comma-separated country list used for
    /// regional lookups; empty means regional lookups are unrestricted.
    pub fn with_client(
        client: impl GeocodingClient + 'static,
        country_filter: impl Into<String>,
    ) -> Self {
        Self {
            client: Box::new(client),
            country_filter: country_filter.into(),
        }
    }

    fn country_codes(&self, scope: GeocodeScope) -> Option<&str> {
        match scope {
            GeocodeScope::Regional => {
                Some(self.country_filter.trim()).filter(|codes| !codes.is_empty())
            },
            GeocodeScope::Global => None,
        }
    }
}

fn map_error(error: GeocodingError) -> ApplicationError {
    match error {
        GeocodingError::ParseError(msg) => {
            ApplicationError::MalformedUpstreamResponse(format!("Nominatim: {msg}"))
        },
        other => ApplicationError::UpstreamUnavailable(format!("Nominatim: {other}")),
    }
}

#[async_trait]
impl GeocodingPort for NominatimAdapter {
    #[instrument(skip(self))]
    async fn search(
        &self,
        text: &str,
        scope: GeocodeScope,
    ) -> Result<Vec<GeocodeCandidate>, ApplicationError> {
        match self.client.search(text, self.country_codes(scope)).await {
            Ok(hits) => {
                debug!(count = hits.len(), "Nominatim candidates");
                Ok(hits
                    .into_iter()
                    .map(|hit| GeocodeCandidate::new(hit.latitude, hit.longitude, hit.display_name))
                    .collect())
            },
            Err(GeocodingError::AddressNotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(map_error(e)),
        }
    }

    #[instrument(skip(self))]
    async fn reverse(
        &self,
        location: &GeoLocation,
    ) -> Result<Option<ReverseGeocode>, ApplicationError> {
        match self
            .client
            .reverse_geocode(location.latitude(), location.longitude())
            .await
        {
            Ok(hit) => Ok(Some(ReverseGeocode {
                display_name: hit.display_name,
                address: hit.address,
            })),
            Err(GeocodingError::AddressNotFound(reason)) => {
                debug!(%reason, "No address at location");
                Ok(None)
            },
            Err(e) => Err(map_error(e)),
        }
    }
}

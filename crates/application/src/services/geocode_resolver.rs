//! Geocode resolver
//!
//! Resolves the center of a search. Explicit coordinates are used as-is;
//! otherwise each address variation is geocoded in order, first within the
//! configured region and then worldwide, until one yields a candidate. The
//! worldwide retry is skipped when the regional lookup is not restricted.

use std::sync::Arc;

use domain::entities::SearchQuery;
use domain::value_objects::GeoLocation;
use tracing::{debug, info, instrument, warn};

use super::address_variations::AddressVariationGenerator;
use crate::error::ApplicationError;
use crate::ports::{GeocodeCandidate, GeocodeScope, GeocodingPort};

/// Resolves a [`SearchQuery`] to a center point
#[derive(Clone)]
pub struct GeocodeResolver {
    geocoder: Arc<dyn GeocodingPort>,
    variations: AddressVariationGenerator,
    global_fallback: bool,
}

impl std::fmt::Debug for GeocodeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodeResolver")
            .field("variations", &self.variations)
            .field("global_fallback", &self.global_fallback)
            .finish_non_exhaustive()
    }
}

/// Lookup bookkeeping across variations
#[derive(Debug, Default)]
struct Attempts {
    variations: usize,
    lookups: usize,
    failed_lookups: usize,
    last_error: Option<ApplicationError>,
}

impl GeocodeResolver {
    /// Create a resolver with the default variation rules
    pub fn new(geocoder: Arc<dyn GeocodingPort>) -> Self {
        Self::with_variations(geocoder, AddressVariationGenerator::default())
    }

    /// Create a resolver with a custom variation generator
    pub fn with_variations(
        geocoder: Arc<dyn GeocodingPort>,
        variations: AddressVariationGenerator,
    ) -> Self {
        Self {
            geocoder,
            variations,
            global_fallback: true,
        }
    }

    /// Enable or disable the worldwide retry after an empty regional lookup
    ///
    /// Disable it when regional lookups carry no country restriction; the
    /// retry would repeat the same request.
    #[must_use]
    pub const fn with_global_fallback(mut self, enabled: bool) -> Self {
        self.global_fallback = enabled;
        self
    }

    /// Whether empty regional lookups are retried worldwide
    pub const fn global_fallback(&self) -> bool {
        self.global_fallback
    }

    /// Resolve the search center
    ///
    /// Variations are tried strictly one after another and the first that
    /// yields a candidate wins. A lookup that fails in transport counts as
    /// "no result"; only when every lookup failed is the outcome an upstream
    /// error. That error is [`ApplicationError::MalformedUpstreamResponse`]
    /// when the last failure was an unparseable body and
    /// [`ApplicationError::UpstreamUnavailable`] otherwise.
    #[instrument(skip(self, query), fields(query = %query.query))]
    pub async fn resolve(&self, query: &SearchQuery) -> Result<GeoLocation, ApplicationError> {
        if let Some((lat, lng)) = query.coordinates() {
            debug!(lat, lng, "Using explicit coordinates");
            return Ok(GeoLocation::new(lat, lng)?);
        }

        let Some(text) = query.location_text() else {
            return Err(ApplicationError::MissingLocation);
        };

        let variations = self.variations.generate(text);
        debug!(?variations, "Geocoding address variations");

        let mut attempts = Attempts::default();
        for variation in &variations {
            attempts.variations += 1;

            let mut candidates = self
                .lookup(variation, GeocodeScope::Regional, &mut attempts)
                .await;
            if candidates.is_empty() && self.global_fallback {
                candidates = self
                    .lookup(variation, GeocodeScope::Global, &mut attempts)
                    .await;
            }

            if let Some(best) = select_best_candidate(&candidates, text) {
                let center = GeoLocation::new(best.lat, best.lng)?;
                info!(
                    %variation,
                    display_name = %best.display_name,
                    %center,
                    "Location geocoded"
                );
                return Ok(center);
            }
        }

        if attempts.lookups > 0 && attempts.failed_lookups == attempts.lookups {
            return Err(upstream_failure(attempts.last_error));
        }

        warn!(attempts = attempts.variations, "No variation could be geocoded");
        Err(ApplicationError::GeocodingFailed {
            attempts: attempts.variations,
        })
    }

    async fn lookup(
        &self,
        variation: &str,
        scope: GeocodeScope,
        attempts: &mut Attempts,
    ) -> Vec<GeocodeCandidate> {
        attempts.lookups += 1;
        match self.geocoder.search(variation, scope).await {
            Ok(candidates) => {
                debug!(%variation, ?scope, count = candidates.len(), "Geocoding lookup");
                candidates
            },
            Err(e) => {
                warn!(%variation, ?scope, error = %e, "Geocoding lookup failed");
                attempts.failed_lookups += 1;
                attempts.last_error = Some(e);
                Vec::new()
            },
        }
    }
}

/// Error reported when every geocoding lookup failed
fn upstream_failure(last_error: Option<ApplicationError>) -> ApplicationError {
    match last_error {
        Some(e @ (ApplicationError::MalformedUpstreamResponse(_)
        | ApplicationError::UpstreamUnavailable(_))) => e,
        Some(e) => ApplicationError::UpstreamUnavailable(e.to_string()),
        None => ApplicationError::UpstreamUnavailable("geocoding service unreachable".to_string()),
    }
}

/// Pick the candidate that best matches the original address
///
/// The first candidate whose description contains (case-insensitively) any
/// non-empty comma-separated segment of `original` wins; otherwise the first
/// candidate.
pub fn select_best_candidate<'a>(
    candidates: &'a [GeocodeCandidate],
    original: &str,
) -> Option<&'a GeocodeCandidate> {
    let segments: Vec<String> = original
        .to_lowercase()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();

    candidates
        .iter()
        .find(|candidate| {
            let description = candidate.display_name.to_lowercase();
            segments.iter().any(|segment| description.contains(segment.as_str()))
        })
        .or_else(|| candidates.first())
}

//! Address enricher
//!
//! Fills in addresses for places the normalizer could not describe, using
//! reverse geocoding. Lookups run concurrently with a bounded fan-out and a
//! per-call timeout. Failures only leave the affected place without an
//! address; they never fail the batch.

use std::sync::Arc;
use std::time::Duration;

use domain::entities::Place;
use domain::value_objects::GeoLocation;
use futures::StreamExt;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::ports::{GeocodingPort, ReverseGeocode};

/// Default number of concurrent reverse lookups
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Default per-lookup timeout
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(5000);

const STREET_KEYS: &[&str] = &["road", "pedestrian", "footway"];
const LOCALITY_KEYS: &[&str] = &["city", "town", "municipality", "village"];

/// Reverse-geocodes places that have no address
#[derive(Clone)]
pub struct AddressEnricher {
    geocoder: Arc<dyn GeocodingPort>,
    max_concurrency: usize,
    lookup_timeout: Duration,
}

impl std::fmt::Debug for AddressEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressEnricher")
            .field("max_concurrency", &self.max_concurrency)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish_non_exhaustive()
    }
}

impl AddressEnricher {
    /// Create an enricher with default limits
    pub fn new(geocoder: Arc<dyn GeocodingPort>) -> Self {
        Self {
            geocoder,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Set the maximum number of lookups in flight (at least 1)
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Set the per-lookup timeout
    #[must_use]
    pub const fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Enrich every place lacking an address
    ///
    /// Places that already have an address are never touched. When
    /// `deadline` passes, outstanding lookups are abandoned and the addresses
    /// found so far are kept. Returns the number of places updated.
    #[instrument(skip(self, places), fields(places = places.len()))]
    pub async fn enrich(&self, places: &mut [Place], deadline: Option<Instant>) -> usize {
        let pending: Vec<(usize, GeoLocation)> = places
            .iter()
            .enumerate()
            .filter(|(_, place)| !place.has_address())
            .map(|(index, place)| (index, place.location()))
            .collect();

        if pending.is_empty() {
            return 0;
        }
        debug!(pending = pending.len(), "Reverse geocoding places without address");

        let lookup_timeout = self.lookup_timeout;
        let mut lookups = futures::stream::iter(pending)
            .map(|(index, location)| {
                let geocoder = Arc::clone(&self.geocoder);
                async move {
                    let outcome =
                        tokio::time::timeout(lookup_timeout, geocoder.reverse(&location)).await;
                    (index, outcome)
                }
            })
            .buffer_unordered(self.max_concurrency);

        let mut found: Vec<(usize, String)> = Vec::new();
        loop {
            let next = match deadline {
                Some(deadline) => {
                    if let Ok(next) = tokio::time::timeout_at(deadline, lookups.next()).await {
                        next
                    } else {
                        warn!("Enrichment deadline reached, keeping completed lookups");
                        break;
                    }
                },
                None => lookups.next().await,
            };
            let Some((index, outcome)) = next else {
                break;
            };

            match outcome {
                Ok(Ok(Some(reverse))) => {
                    if let Some(address) = extract_address(&reverse) {
                        found.push((index, address));
                    }
                },
                Ok(Ok(None)) => debug!(index, "No reverse geocoding result"),
                Ok(Err(e)) => warn!(index, error = %e, "Reverse geocoding failed"),
                Err(_) => warn!(index, ?lookup_timeout, "Reverse geocoding timed out"),
            }
        }
        drop(lookups);

        let mut updated = 0;
        for (index, address) in found {
            let Some(place) = places.get_mut(index) else {
                continue;
            };
            if address != place.name {
                place.set_address(address);
                updated += 1;
            }
        }

        debug!(updated, "Enrichment finished");
        updated
    }
}

/// Derive an address line from a reverse lookup
///
/// Prefers structured fields (`road` + `house_number`, then the locality);
/// falls back to the free-text description unless it only repeats
/// coordinates.
pub fn extract_address(reverse: &ReverseGeocode) -> Option<String> {
    let street = reverse.first_of(STREET_KEYS).map(|road| {
        match reverse.first_of(&["house_number"]) {
            Some(number) => format!("{road} {number}"),
            None => road.to_string(),
        }
    });
    let locality = reverse.first_of(LOCALITY_KEYS).map(ToString::to_string);

    let parts: Vec<String> = [street, locality].into_iter().flatten().collect();
    if !parts.is_empty() {
        return Some(parts.join(", "));
    }

    reverse
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty() && !echoes_coordinates(text))
        .map(ToString::to_string)
}

/// Whether a description is nothing but a coordinate pair
fn echoes_coordinates(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '.' | ',' | '-' | '+'))
}

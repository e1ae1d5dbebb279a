//! Geocoding port
//!
//! Forward lookups turn address text into candidate coordinates; reverse
//! lookups turn coordinates into structured address data.

use std::collections::BTreeMap;

use async_trait::async_trait;
use domain::value_objects::GeoLocation;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Geographic scope of a forward lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodeScope {
    /// Restricted to the configured country codes
    Regional,
    /// No country restriction
    Global,
}

/// A forward geocoding candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Full description returned by the geocoder
    pub display_name: String,
}

impl GeocodeCandidate {
    /// Create a new candidate
    #[must_use]
    pub fn new(lat: f64, lng: f64, display_name: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            display_name: display_name.into(),
        }
    }
}

/// Result of a reverse lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseGeocode {
    /// Free-text description, if any
    pub display_name: Option<String>,
    /// Structured address components keyed by Nominatim field name
    pub address: BTreeMap<String, String>,
}

impl ReverseGeocode {
    /// First non-empty value among `keys`
    #[must_use]
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.address.get(*key))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }
}

/// Port for geocoding lookups
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GeocodingPort: Send + Sync {
    /// Look up candidates for an address text
    ///
    /// An empty list means "no match", not an error.
    async fn search(
        &self,
        text: &str,
        scope: GeocodeScope,
    ) -> Result<Vec<GeocodeCandidate>, ApplicationError>;

    /// Look up the address at a point
    ///
    /// `Ok(None)` means the geocoder knows nothing about the point.
    async fn reverse(
        &self,
        location: &GeoLocation,
    ) -> Result<Option<ReverseGeocode>, ApplicationError>;
}

//! Search query and result entities

use serde::{Deserialize, Serialize};

use super::place::Place;
use crate::value_objects::GeoLocation;

/// Search radius used when the caller does not supply one
pub const DEFAULT_RADIUS_METERS: u32 = 1000;

const fn default_radius() -> u32 {
    DEFAULT_RADIUS_METERS
}

/// A place search request
///
/// Either both coordinates or a non-empty location text must be present
/// for the query to be answerable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text place type, e.g. "cafetería" or "museum"
    pub query: String,
    /// Latitude of the search center
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude of the search center
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// Free-text address used when coordinates are missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_text: Option<String>,
    /// Search radius in meters
    #[serde(default = "default_radius")]
    pub radius_meters: u32,
}

impl SearchQuery {
    /// Search around explicit coordinates
    #[must_use]
    pub fn at_coordinates(query: impl Into<String>, lat: f64, lng: f64, radius_meters: u32) -> Self {
        Self {
            query: query.into(),
            lat: Some(lat),
            lng: Some(lng),
            location_text: None,
            radius_meters,
        }
    }

    /// Search around a free-text address
    #[must_use]
    pub fn near_address(
        query: impl Into<String>,
        location_text: impl Into<String>,
        radius_meters: u32,
    ) -> Self {
        Self {
            query: query.into(),
            lat: None,
            lng: None,
            location_text: Some(location_text.into()),
            radius_meters,
        }
    }

    /// Both coordinates, if supplied
    #[must_use]
    pub const fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }

    /// Trimmed location text, if non-empty
    #[must_use]
    pub fn location_text(&self) -> Option<&str> {
        self.location_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Whether the query carries any usable location information
    #[must_use]
    pub fn has_location(&self) -> bool {
        self.coordinates().is_some() || self.location_text().is_some()
    }
}

/// Outcome of a successful search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Places ordered nearest-first
    pub places: Vec<Place>,
    /// Number of places
    pub count: usize,
    /// The category query as submitted
    pub query: String,
    /// Search radius in meters
    pub radius_meters: u32,
    /// Resolved search center
    pub center: GeoLocation,
}

impl SearchResult {
    /// Build a result, deriving `count` from the places
    #[must_use]
    pub fn new(
        query: impl Into<String>,
        radius_meters: u32,
        center: GeoLocation,
        places: Vec<Place>,
    ) -> Self {
        Self {
            count: places.len(),
            places,
            query: query.into(),
            radius_meters,
            center,
        }
    }

    /// Whether nothing matched
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Human-readable listing of the nearest `limit` places
    #[must_use]
    pub fn format_summary(&self, limit: usize) -> String {
        if self.places.is_empty() {
            return format!(
                "No places of type '{}' found within {} m. Try a larger radius or a different place type.",
                self.query, self.radius_meters
            );
        }

        let mut out = format!("Found {} places for '{}':\n", self.count, self.query);
        for (i, place) in self.places.iter().take(limit).enumerate() {
            let km = place.distance_meters / 1000.0;
            out.push_str(&format!(
                "\n{}. {} ({}) - {km:.2} km",
                i + 1,
                place.name,
                place.place_type
            ));
            if let Some(address) = &place.address {
                out.push_str(&format!("\n   Address: {address}"));
            }
        }

        let remaining = self.count.saturating_sub(limit);
        if remaining > 0 {
            out.push_str(&format!("\n\n... and {remaining} more"));
        }
        out
    }
}

//! OpenStreetMap data models
//!
//! Typed representations of Overpass elements and Nominatim geocoding hits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Parsed Overpass `[out:json]` response
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OverpassResponse {
    /// Elements that parsed cleanly; malformed ones are dropped by the client
    pub elements: Vec<OverpassElement>,
    /// Server remark, set when Overpass aborted the query (e.g. runtime timeout)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

/// A single node, way or relation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverpassElement {
    /// Element kind ("node", "way", "relation", …)
    #[serde(rename = "type")]
    pub element_type: String,
    /// Element identifier
    pub id: i64,
    /// Latitude (nodes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude (nodes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    /// Centroid computed by `out center` (ways and relations)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<OverpassCenter>,
    /// OSM tags
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl OverpassElement {
    /// Direct coordinates, if the element carries both
    #[must_use]
    pub const fn point(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Centroid coordinates, if computed
    #[must_use]
    pub fn centroid(&self) -> Option<(f64, f64)> {
        self.center.as_ref().map(|c| (c.lat, c.lon))
    }
}

/// Centroid of a way or relation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OverpassCenter {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

/// A forward geocoding result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeocodeHit {
    /// Latitude
    pub latitude: f64,
    /// Longitude
    pub longitude: f64,
    /// Full formatted address as returned by Nominatim
    pub display_name: String,
    /// Structured address components (`road`, `city`, …)
    #[serde(default)]
    pub address: BTreeMap<String, String>,
}

/// A reverse geocoding result
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReverseHit {
    /// Full formatted address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Structured address components (`road`, `house_number`, `city`, …)
    #[serde(default)]
    pub address: BTreeMap<String, String>,
}

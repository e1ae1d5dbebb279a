//! Place entity
//!
//! A point of interest normalized from an OSM element. Identity is the
//! `(osm_type, osm_id)` pair.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::{GeoLocation, OsmRef, OsmType};

/// Name used when an element carries no usable name tag
pub const UNNAMED_PLACE: &str = "Unnamed";

/// A geo-tagged point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Display name of the place
    pub name: String,
    /// Latitude of the element (or its centroid)
    pub lat: f64,
    /// Longitude of the element (or its centroid)
    pub lng: f64,
    /// Category derived from the element tags (e.g. "cafe", "park")
    #[serde(rename = "type")]
    pub place_type: String,
    /// Raw OSM tags
    pub tags: BTreeMap<String, String>,
    /// Human-readable street address, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Contact phone number, if tagged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// OSM element identifier
    pub osm_id: i64,
    /// OSM element kind
    pub osm_type: OsmType,
    /// Browse URL on openstreetmap.org
    pub osm_url: String,
    /// Address when known, otherwise the name
    pub display_name: String,
    /// Great-circle distance from the search center
    pub distance_meters: f64,
}

impl Place {
    /// Unique key of this place
    #[must_use]
    pub const fn key(&self) -> OsmRef {
        OsmRef::new(self.osm_type, self.osm_id)
    }

    /// Coordinates of this place
    #[must_use]
    pub const fn location(&self) -> GeoLocation {
        GeoLocation::new_unchecked(self.lat, self.lng)
    }

    /// Whether an address is already known
    #[must_use]
    pub const fn has_address(&self) -> bool {
        self.address.is_some()
    }

    /// Record an address found after normalization
    ///
    /// The display name follows the address.
    pub fn set_address(&mut self, address: impl Into<String>) {
        let address = address.into();
        self.display_name.clone_from(&address);
        self.address = Some(address);
    }
}

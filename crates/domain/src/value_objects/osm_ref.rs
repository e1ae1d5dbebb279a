//! OpenStreetMap element reference

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

const OSM_BROWSE_URL: &str = "https://www.openstreetmap.org";

/// Kind of OSM element a feature was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmType {
    /// A single point
    Node,
    /// A polyline or polygon; located through its centroid
    Way,
    /// A group of elements; located through its centroid
    Relation,
}

impl OsmType {
    /// Lowercase name as used in OSM URLs and Overpass QL
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }

    /// All element kinds a spatial search covers
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Node, Self::Way, Self::Relation]
    }
}

impl fmt::Display for OsmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OsmType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(Self::Node),
            "way" => Ok(Self::Way),
            "relation" => Ok(Self::Relation),
            other => Err(DomainError::InvalidOsmType(other.to_string())),
        }
    }
}

/// Unique key of a place: `(osm_type, osm_id)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OsmRef {
    /// Element kind
    pub osm_type: OsmType,
    /// Element identifier, unique per kind
    pub osm_id: i64,
}

impl OsmRef {
    /// Create a new element reference
    #[must_use]
    pub const fn new(osm_type: OsmType, osm_id: i64) -> Self {
        Self { osm_type, osm_id }
    }

    /// Browse URL on openstreetmap.org
    #[must_use]
    pub fn url(&self) -> String {
        format!("{OSM_BROWSE_URL}/{}/{}", self.osm_type, self.osm_id)
    }
}

impl fmt::Display for OsmRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.osm_type, self.osm_id)
    }
}

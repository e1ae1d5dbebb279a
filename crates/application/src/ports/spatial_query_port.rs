//! Spatial backend port
//!
//! Executes a [`SpatialQuery`] and returns raw features for normalization.

use std::collections::BTreeMap;

use async_trait::async_trait;
use domain::value_objects::GeoLocation;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;
use crate::services::SpatialQuery;

/// A feature as returned by the spatial backend, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFeature {
    /// Element kind as reported by the backend ("node", "way", "relation", ...)
    pub kind: String,
    /// Element identifier
    pub id: i64,
    /// Direct coordinates (points)
    pub coordinates: Option<GeoLocation>,
    /// Derived centroid (ways and relations)
    pub centroid: Option<GeoLocation>,
    /// Feature tags
    pub tags: BTreeMap<String, String>,
}

impl RawFeature {
    /// Resolvable position: direct coordinates, else the centroid
    #[must_use]
    pub fn position(&self) -> Option<GeoLocation> {
        self.coordinates.or(self.centroid)
    }
}

/// Port for spatial feature retrieval
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpatialQueryPort: Send + Sync {
    /// Fetch every feature matching the query
    ///
    /// Transport failures and non-success responses map to
    /// [`ApplicationError::UpstreamUnavailable`]; unparseable bodies map to
    /// [`ApplicationError::MalformedUpstreamResponse`].
    async fn fetch(&self, query: &SpatialQuery) -> Result<Vec<RawFeature>, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn SpatialQueryPort) {}

    #[test]
    fn position_prefers_direct_coordinates() {
        let feature = RawFeature {
            kind: "way".to_string(),
            id: 1,
            coordinates: Some(GeoLocation::madrid()),
            centroid: Some(GeoLocation::barcelona()),
            tags: BTreeMap::new(),
        };
        assert_eq!(feature.position(), Some(GeoLocation::madrid()));
    }

    #[test]
    fn position_falls_back_to_centroid() {
        let feature = RawFeature {
            kind: "relation".to_string(),
            id: 2,
            coordinates: None,
            centroid: Some(GeoLocation::barcelona()),
            tags: BTreeMap::new(),
        };
        assert_eq!(feature.position(), Some(GeoLocation::barcelona()));
    }
}

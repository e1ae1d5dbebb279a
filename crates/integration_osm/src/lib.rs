//! OpenStreetMap integration for PlaceFinder
//!
//! Provides address geocoding via [Nominatim](https://nominatim.openstreetmap.org)
//! and point-of-interest retrieval via the [Overpass API](https://overpass-api.de).
//!
//! # Architecture
//!
//! The crate follows a client-trait pattern consistent with other integration crates.
//! [`GeocodingClient`] defines forward and reverse geocoding, implemented by
//! [`NominatimGeocodingClient`]. [`OverpassClient`] executes Overpass QL queries,
//! implemented by [`HttpOverpassClient`].
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_osm::{HttpOverpassClient, OverpassClient, OverpassConfig};
//!
//! let client = HttpOverpassClient::new(&OverpassConfig::default())?;
//! let response = client
//!     .execute("[out:json][timeout:25];node[amenity=cafe](around:500,40.4168,-3.7038);out center meta;")
//!     .await?;
//! println!("{} elements", response.elements.len());
//! ```

mod config;
mod error;
mod models;
mod nominatim;
mod overpass;

pub use config::OverpassConfig;
pub use error::OverpassError;
pub use models::{GeocodeHit, OverpassCenter, OverpassElement, OverpassResponse, ReverseHit};
pub use nominatim::{GeocodingClient, GeocodingError, NominatimConfig, NominatimGeocodingClient};
pub use overpass::{HttpOverpassClient, OverpassClient};

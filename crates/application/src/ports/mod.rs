//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod geocoding_port;
mod spatial_query_port;

#[cfg(test)]
pub use geocoding_port::MockGeocodingPort;
pub use geocoding_port::{GeocodeCandidate, GeocodeScope, GeocodingPort, ReverseGeocode};
#[cfg(test)]
pub use spatial_query_port::MockSpatialQueryPort;
pub use spatial_query_port::{RawFeature, SpatialQueryPort};

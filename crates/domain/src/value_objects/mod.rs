//! Value Objects - Immutable, identity-less domain primitives

mod filter_predicate;
mod geo_location;
mod osm_ref;

pub use filter_predicate::{CategoryFilter, FilterPredicate, KeywordMatch};
pub use geo_location::{EARTH_RADIUS_METERS, GeoLocation};
pub use osm_ref::{OsmRef, OsmType};

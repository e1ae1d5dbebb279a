//! Domain entities - Objects with identity and lifecycle

mod place;
mod search;

pub use place::{Place, UNNAMED_PLACE};
pub use search::{DEFAULT_RADIUS_METERS, SearchQuery, SearchResult};

//! Infrastructure adapters
//!
//! Adapters connect application ports to the OSM clients.

mod nominatim_adapter;
mod overpass_adapter;

pub use nominatim_adapter::NominatimAdapter;
pub use overpass_adapter::OverpassAdapter;

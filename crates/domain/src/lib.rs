//! Domain layer for PlaceFinder
//!
//! Contains the core place-search vocabulary: coordinates, OSM element
//! references, filter predicates, places and search results.
//! This layer performs no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;

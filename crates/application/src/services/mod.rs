//! Application services - Use case implementations

mod address_enricher;
mod address_variations;
mod category_interpreter;
mod geocode_resolver;
mod result_normalizer;
mod search_service;
mod spatial_query;

pub use address_enricher::{
    AddressEnricher, DEFAULT_LOOKUP_TIMEOUT, DEFAULT_MAX_CONCURRENCY, extract_address,
};
pub use address_variations::{
    AddressVariationGenerator, DEFAULT_COUNTRY_SUFFIXES, generate_address_variations,
};
pub use category_interpreter::{
    CategoryDictionary, CategoryInterpreter, DEFAULT_KEYWORDS, DictionaryEntry,
};
pub use geocode_resolver::{GeocodeResolver, select_best_candidate};
pub use result_normalizer::{GENERIC_PLACE_TYPE, ResultNormalizer};
pub use search_service::{SearchConfig, SearchService, SearchStage};
pub use spatial_query::{
    DEFAULT_QUERY_TIMEOUT_SECS, PredicateCombination, SpatialQuery, SpatialQueryBuilder,
};

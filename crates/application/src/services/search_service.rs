//! Search service - place search orchestration
//!
//! Runs one search from validation to a sorted [`SearchResult`]:
//! resolve the center, interpret the category, query the spatial backend,
//! normalize, enrich missing addresses and sort by distance.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use domain::entities::{DEFAULT_RADIUS_METERS, SearchQuery, SearchResult};
use domain::value_objects::GeoLocation;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::address_enricher::{AddressEnricher, DEFAULT_MAX_CONCURRENCY, extract_address};
use super::address_variations::{AddressVariationGenerator, DEFAULT_COUNTRY_SUFFIXES};
use super::category_interpreter::CategoryInterpreter;
use super::geocode_resolver::GeocodeResolver;
use super::result_normalizer::ResultNormalizer;
use super::spatial_query::{DEFAULT_QUERY_TIMEOUT_SECS, PredicateCombination, SpatialQueryBuilder};
use crate::error::ApplicationError;
use crate::ports::{GeocodingPort, SpatialQueryPort};

/// Search tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Radius used when a request omits one
    #[serde(default = "default_radius_meters")]
    pub default_radius_meters: u32,

    /// Largest accepted radius (no cap when unset)
    #[serde(default)]
    pub max_radius_meters: Option<u32>,

    /// How predicates from several matched keywords combine
    #[serde(default)]
    pub predicate_combination: PredicateCombination,

    /// Preferred `name:<lang>` tag
    #[serde(default = "default_name_language")]
    pub name_language: String,

    /// Fallback `name:<lang>` tag after the plain `name`
    #[serde(default = "default_alternate_name_language")]
    pub alternate_name_language: String,

    /// Concurrent reverse lookups during enrichment
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Timeout per reverse lookup in milliseconds
    #[serde(default = "default_enrichment_timeout_ms")]
    pub enrichment_timeout_ms: u64,

    /// Overall enrichment budget in milliseconds (unbounded if unset)
    #[serde(default)]
    pub enrichment_deadline_ms: Option<u64>,

    /// Country names stripped from addresses when building variations
    #[serde(default = "default_country_suffixes")]
    pub country_suffixes: Vec<String>,
}

const fn default_radius_meters() -> u32 {
    DEFAULT_RADIUS_METERS
}

fn default_name_language() -> String {
    "es".to_string()
}

fn default_alternate_name_language() -> String {
    "en".to_string()
}

const fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

const fn default_enrichment_timeout_ms() -> u64 {
    5000
}

fn default_country_suffixes() -> Vec<String> {
    DEFAULT_COUNTRY_SUFFIXES
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_meters: default_radius_meters(),
            max_radius_meters: None,
            predicate_combination: PredicateCombination::default(),
            name_language: default_name_language(),
            alternate_name_language: default_alternate_name_language(),
            max_concurrency: default_max_concurrency(),
            enrichment_timeout_ms: default_enrichment_timeout_ms(),
            enrichment_deadline_ms: None,
            country_suffixes: default_country_suffixes(),
        }
    }
}

impl SearchConfig {
    /// Per-lookup enrichment timeout
    #[must_use]
    pub const fn enrichment_timeout(&self) -> Duration {
        Duration::from_millis(self.enrichment_timeout_ms)
    }

    /// Overall enrichment budget, if any
    #[must_use]
    pub fn enrichment_deadline(&self) -> Option<Duration> {
        self.enrichment_deadline_ms.map(Duration::from_millis)
    }
}

/// Stages of a search, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStage {
    /// Checking the request
    Validating,
    /// Turning the location into coordinates
    ResolvingCenter,
    /// Interpreting the category and building the spatial query
    BuildingQuery,
    /// Calling the spatial backend
    Fetching,
    /// Converting raw features into places
    Normalizing,
    /// Filling in missing addresses
    Enriching,
    /// Ordering by distance
    Sorting,
    /// Finished
    Done,
}

impl SearchStage {
    /// Lowercase stage name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::ResolvingCenter => "resolving-center",
            Self::BuildingQuery => "building-query",
            Self::Fetching => "fetching",
            Self::Normalizing => "normalizing",
            Self::Enriching => "enriching",
            Self::Sorting => "sorting",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for SearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Place search use case
pub struct SearchService {
    geocoder: Arc<dyn GeocodingPort>,
    spatial: Arc<dyn SpatialQueryPort>,
    resolver: GeocodeResolver,
    interpreter: CategoryInterpreter,
    builder: SpatialQueryBuilder,
    normalizer: ResultNormalizer,
    enricher: AddressEnricher,
    config: SearchConfig,
}

impl fmt::Debug for SearchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchService")
            .field("config", &self.config)
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl SearchService {
    /// Create a search service with the default keyword dictionary
    pub fn new(
        geocoder: Arc<dyn GeocodingPort>,
        spatial: Arc<dyn SpatialQueryPort>,
        config: SearchConfig,
    ) -> Self {
        let variations = AddressVariationGenerator::new(config.country_suffixes.iter().cloned());
        let resolver = GeocodeResolver::with_variations(Arc::clone(&geocoder), variations);
        let builder =
            SpatialQueryBuilder::new(config.predicate_combination, DEFAULT_QUERY_TIMEOUT_SECS);
        let normalizer =
            ResultNormalizer::new(&config.name_language, &config.alternate_name_language);
        let enricher = AddressEnricher::new(Arc::clone(&geocoder))
            .with_max_concurrency(config.max_concurrency)
            .with_lookup_timeout(config.enrichment_timeout());

        Self {
            geocoder,
            spatial,
            resolver,
            interpreter: CategoryInterpreter::default(),
            builder,
            normalizer,
            enricher,
            config,
        }
    }

    /// Use a custom category interpreter
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: CategoryInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Enable or disable the worldwide geocoding retry
    #[must_use]
    pub fn with_global_fallback(mut self, enabled: bool) -> Self {
        self.resolver = self.resolver.with_global_fallback(enabled);
        self
    }

    /// Whether empty regional geocoding lookups are retried worldwide
    pub const fn global_fallback(&self) -> bool {
        self.resolver.global_fallback()
    }

    /// Set the server-side timeout hint attached to spatial queries
    #[must_use]
    pub const fn with_query_timeout_secs(mut self, timeout_secs: u32) -> Self {
        self.builder = SpatialQueryBuilder::new(self.builder.combination(), timeout_secs);
        self
    }

    /// Active configuration
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run a search
    ///
    /// An empty result is a success. Enrichment problems never fail the
    /// search; they only leave addresses unset.
    #[instrument(skip(self, query), fields(query = %query.query, radius = query.radius_meters))]
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResult, ApplicationError> {
        let started = Instant::now();

        enter(SearchStage::Validating);
        self.validate(&query)
            .map_err(|e| failed(SearchStage::Validating, e))?;

        enter(SearchStage::ResolvingCenter);
        let center = self
            .resolver
            .resolve(&query)
            .await
            .map_err(|e| failed(SearchStage::ResolvingCenter, e))?;

        enter(SearchStage::BuildingQuery);
        let filter = self.interpreter.interpret(&query.query);
        let spatial_query = self.builder.build(&filter, center, query.radius_meters);
        debug!(ql = %spatial_query.to_overpass_ql(), "Spatial query built");

        enter(SearchStage::Fetching);
        let features = self
            .spatial
            .fetch(&spatial_query)
            .await
            .map_err(|e| failed(SearchStage::Fetching, e))?;

        enter(SearchStage::Normalizing);
        let mut places = self.normalizer.normalize(features, center);

        enter(SearchStage::Enriching);
        let deadline = self
            .config
            .enrichment_deadline()
            .map(|budget| Instant::now() + budget);
        let enriched = self.enricher.enrich(&mut places, deadline).await;

        enter(SearchStage::Sorting);
        places.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));

        enter(SearchStage::Done);
        info!(
            count = places.len(),
            enriched,
            %center,
            elapsed_ms = started.elapsed().as_millis(),
            "Search completed"
        );
        Ok(SearchResult::new(
            query.query,
            query.radius_meters,
            center,
            places,
        ))
    }

    /// Describe the address at a point
    ///
    /// Returns `Ok(None)` when the geocoder knows nothing about the point.
    #[instrument(skip(self))]
    pub async fn reverse_geocode(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<Option<String>, ApplicationError> {
        let location = GeoLocation::new(lat, lng)?;
        let Some(reverse) = self.geocoder.reverse(&location).await? else {
            return Ok(None);
        };

        Ok(reverse
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
            .or_else(|| extract_address(&reverse)))
    }

    fn validate(&self, query: &SearchQuery) -> Result<(), ApplicationError> {
        if !query.has_location() || query.query.trim().is_empty() {
            return Err(ApplicationError::MissingLocation);
        }
        if query.radius_meters == 0 {
            return Err(ApplicationError::InvalidQuery(
                "radius_meters must be positive".to_string(),
            ));
        }
        if let Some(max) = self
            .config
            .max_radius_meters
            .filter(|max| query.radius_meters > *max)
        {
            return Err(ApplicationError::InvalidQuery(format!(
                "radius_meters must not exceed {max}"
            )));
        }
        Ok(())
    }
}

fn enter(stage: SearchStage) {
    debug!(%stage, "Search stage");
}

fn failed(stage: SearchStage, error: ApplicationError) -> ApplicationError {
    warn!(%stage, %error, "Search failed");
    error
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use domain::value_objects::FilterPredicate;

    use super::*;
    use crate::ports::{
        GeocodeCandidate, MockGeocodingPort, MockSpatialQueryPort, RawFeature, ReverseGeocode,
    };

    fn node(id: i64, lat: f64, lng: f64, pairs: &[(&str, &str)]) -> RawFeature {
        RawFeature {
            kind: "node".to_string(),
            id,
            coordinates: Some(GeoLocation::new_unchecked(lat, lng)),
            centroid: None,
            tags: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    fn service(geocoder: MockGeocodingPort, spatial: MockSpatialQueryPort) -> SearchService {
        SearchService::new(Arc::new(geocoder), Arc::new(spatial), SearchConfig::default())
    }

    #[test]
    fn search_config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.default_radius_meters, 1000);
        assert_eq!(config.max_radius_meters, None);
        assert_eq!(config.predicate_combination, PredicateCombination::All);
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.enrichment_timeout(), Duration::from_secs(5));
        assert_eq!(config.enrichment_deadline(), None);
        assert_eq!(config.country_suffixes, vec!["España", "Spain"]);
    }

    #[test]
    fn search_config_partial_deserialization() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"predicate_combination": "any_keyword", "enrichment_deadline_ms": 2500}"#)
                .unwrap();
        assert_eq!(config.predicate_combination, PredicateCombination::AnyKeyword);
        assert_eq!(config.enrichment_deadline(), Some(Duration::from_millis(2500)));
        assert_eq!(config.name_language, "es");
    }

    #[test]
    fn stage_names() {
        assert_eq!(SearchStage::ResolvingCenter.to_string(), "resolving-center");
        assert_eq!(SearchStage::Done.as_str(), "done");
    }

    #[tokio::test]
    async fn missing_location_fails_before_network() {
        let svc = service(MockGeocodingPort::new(), MockSpatialQueryPort::new());
        let query = SearchQuery::near_address("museo", "", 1000);

        let result = svc.search(query).await;
        assert!(matches!(result, Err(ApplicationError::MissingLocation)));
    }

    #[tokio::test]
    async fn missing_location_wins_over_empty_query() {
        let svc = service(MockGeocodingPort::new(), MockSpatialQueryPort::new());
        let mut query = SearchQuery::near_address("", "  ", 1000);
        query.lat = Some(40.0);

        let result = svc.search(query).await;
        assert!(matches!(result, Err(ApplicationError::MissingLocation)));
    }

    #[tokio::test]
    async fn blank_query_is_missing_location() {
        let svc = service(MockGeocodingPort::new(), MockSpatialQueryPort::new());

        let result = svc
            .search(SearchQuery::at_coordinates("   ", 40.0, -3.0, 1000))
            .await;
        assert!(matches!(result, Err(ApplicationError::MissingLocation)));
    }

    #[tokio::test]
    async fn zero_radius_is_invalid() {
        let svc = service(MockGeocodingPort::new(), MockSpatialQueryPort::new());

        let result = svc
            .search(SearchQuery::at_coordinates("cafe", 40.0, -3.0, 0))
            .await;
        assert!(matches!(result, Err(ApplicationError::InvalidQuery(_))));
    }

    #[tokio::test]
    async fn large_radius_accepted_without_cap() {
        let mut spatial = MockSpatialQueryPort::new();
        spatial
            .expect_fetch()
            .withf(|q| q.radius_meters == 60_000)
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let svc = service(MockGeocodingPort::new(), spatial);
        let result = svc
            .search(SearchQuery::at_coordinates("cafe", 40.0, -3.0, 60_000))
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.radius_meters, 60_000);
    }

    #[tokio::test]
    async fn configured_radius_cap_is_enforced() {
        let config = SearchConfig {
            max_radius_meters: Some(50_000),
            ..SearchConfig::default()
        };
        let svc = SearchService::new(
            Arc::new(MockGeocodingPort::new()),
            Arc::new(MockSpatialQueryPort::new()),
            config,
        );

        let result = svc
            .search(SearchQuery::at_coordinates("cafe", 40.0, -3.0, 50_001))
            .await;
        assert!(matches!(result, Err(ApplicationError::InvalidQuery(_))));
    }

    #[tokio::test]
    async fn coordinates_search_uses_input_center() {
        let mut spatial = MockSpatialQueryPort::new();
        spatial
            .expect_fetch()
            .withf(|q| {
                q.radius_meters == 2000
                    && q.center == GeoLocation::new_unchecked(40.4168, -3.7038)
                    && q.clauses == vec![vec![FilterPredicate::tag("leisure", "park")]]
            })
            .times(1)
            .returning(|_| {
                Ok(vec![node(
                    1,
                    40.4153,
                    -3.6845,
                    &[("leisure", "park"), ("name", "Retiro"), ("addr:city", "Madrid")],
                )])
            });

        let svc = service(MockGeocodingPort::new(), spatial);
        let result = svc
            .search(SearchQuery::at_coordinates("parque", 40.4168, -3.7038, 2000))
            .await
            .unwrap();

        assert_eq!(result.center, GeoLocation::new_unchecked(40.4168, -3.7038));
        assert_eq!(result.count, 1);
        assert_eq!(result.places[0].place_type, "park");
        assert_eq!(result.query, "parque");
        assert_eq!(result.radius_meters, 2000);
    }

    #[tokio::test]
    async fn empty_backend_result_is_success() {
        let mut spatial = MockSpatialQueryPort::new();
        spatial.expect_fetch().returning(|_| Ok(Vec::new()));

        let svc = service(MockGeocodingPort::new(), spatial);
        let result = svc
            .search(SearchQuery::at_coordinates("museo", 40.0, -3.0, 500))
            .await
            .unwrap();

        assert!(result.is_empty());
        assert_eq!(result.count, 0);
    }

    #[tokio::test]
    async fn fetch_errors_are_terminal() {
        let mut spatial = MockSpatialQueryPort::new();
        spatial.expect_fetch().returning(|_| {
            Err(ApplicationError::MalformedUpstreamResponse(
                "expected value at line 1".to_string(),
            ))
        });

        let svc = service(MockGeocodingPort::new(), spatial);
        let result = svc
            .search(SearchQuery::at_coordinates("cafe", 40.0, -3.0, 500))
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::MalformedUpstreamResponse(_))
        ));
    }

    #[tokio::test]
    async fn results_sorted_and_enriched() {
        let mut geocoder = MockGeocodingPort::new();
        geocoder.expect_reverse().times(1).returning(|_| {
            Ok(Some(ReverseGeocode {
                display_name: None,
                address: BTreeMap::from([
                    ("road".to_string(), "Calle de Atocha".to_string()),
                    ("city".to_string(), "Madrid".to_string()),
                ]),
            }))
        });

        let mut spatial = MockSpatialQueryPort::new();
        spatial.expect_fetch().returning(|_| {
            Ok(vec![
                node(1, 40.4300, -3.7038, &[("amenity", "cafe"), ("name", "Far"), ("addr:city", "Madrid")]),
                node(2, 40.4170, -3.7038, &[("amenity", "cafe"), ("name", "Near")]),
                node(3, 40.4200, -3.7038, &[("amenity", "cafe"), ("name", "Mid"), ("addr:city", "Madrid")]),
            ])
        });

        let svc = service(geocoder, spatial);
        let result = svc
            .search(SearchQuery::at_coordinates("cafe", 40.4168, -3.7038, 2000))
            .await
            .unwrap();

        let names: Vec<&str> = result.places.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Near", "Mid", "Far"]);
        assert_eq!(result.places[0].address.as_deref(), Some("Calle de Atocha, Madrid"));
        assert!(result
            .places
            .windows(2)
            .all(|w| w[0].distance_meters <= w[1].distance_meters));
    }

    #[tokio::test]
    async fn address_search_end_to_end() {
        let mut geocoder = MockGeocodingPort::new();
        geocoder
            .expect_search()
            .withf(|text, _| text == "Madrid, España")
            .times(1)
            .returning(|_, _| {
                Ok(vec![GeocodeCandidate::new(
                    40.4168,
                    -3.7038,
                    "Madrid, Comunidad de Madrid, España",
                )])
            });

        let mut spatial = MockSpatialQueryPort::new();
        spatial
            .expect_fetch()
            .withf(|q| {
                q.to_overpass_ql().contains("node[\"amenity\"=\"cafe\"](around:1000,40.4168,-3.7038)")
            })
            .returning(|_| {
                Ok(vec![node(
                    9,
                    40.4160,
                    -3.7040,
                    &[
                        ("amenity", "cafe"),
                        ("name", "Café del Sol"),
                        ("addr:street", "Calle Mayor"),
                        ("addr:housenumber", "3"),
                    ],
                )])
            });

        let svc = service(geocoder, spatial);
        let result = svc
            .search(SearchQuery::near_address(
                "cafetería",
                "Calle Mayor 5, Madrid, 28013, España",
                1000,
            ))
            .await
            .unwrap();

        assert_eq!(result.center, GeoLocation::new_unchecked(40.4168, -3.7038));
        assert_eq!(result.count, 1);
        assert_eq!(result.places[0].address.as_deref(), Some("Calle Mayor 3"));
    }

    #[tokio::test]
    async fn reverse_geocode_prefers_display_name() {
        let mut geocoder = MockGeocodingPort::new();
        geocoder.expect_reverse().returning(|_| {
            Ok(Some(ReverseGeocode {
                display_name: Some("Puerta del Sol, Madrid, España".to_string()),
                address: BTreeMap::from([("road".to_string(), "Puerta del Sol".to_string())]),
            }))
        });

        let svc = service(geocoder, MockSpatialQueryPort::new());
        let address = svc.reverse_geocode(40.4169, -3.7035).await.unwrap();
        assert_eq!(address.as_deref(), Some("Puerta del Sol, Madrid, España"));
    }

    #[tokio::test]
    async fn reverse_geocode_validates_coordinates() {
        let svc = service(MockGeocodingPort::new(), MockSpatialQueryPort::new());
        let result = svc.reverse_geocode(0.0, 200.0).await;
        assert!(matches!(result, Err(ApplicationError::Domain(_))));
    }

    #[tokio::test]
    async fn reverse_geocode_unknown_point() {
        let mut geocoder = MockGeocodingPort::new();
        geocoder.expect_reverse().returning(|_| Ok(None));

        let svc = service(geocoder, MockSpatialQueryPort::new());
        assert_eq!(svc.reverse_geocode(0.0, 0.0).await.unwrap(), None);
    }
}

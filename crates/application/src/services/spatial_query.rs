//! Spatial query construction
//!
//! Turns a [`CategoryFilter`] plus a center and radius into a backend-neutral
//! [`SpatialQuery`], rendered to Overpass QL on demand.

use std::fmt;

use domain::value_objects::{CategoryFilter, FilterPredicate, GeoLocation, OsmType};
use serde::{Deserialize, Serialize};

/// Default server-side processing timeout hint in seconds
pub const DEFAULT_QUERY_TIMEOUT_SECS: u32 = 25;

/// How predicates from several matched keywords are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateCombination {
    /// Every predicate from every keyword must hold (single clause)
    #[default]
    All,
    /// Any keyword group may match; predicates within a group must all hold
    AnyKeyword,
}

impl fmt::Display for PredicateCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::AnyKeyword => write!(f, "any_keyword"),
        }
    }
}

/// A radius search over nodes, ways and relations
///
/// Each clause is a conjunction of predicates; clauses are alternatives.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialQuery {
    /// Alternative predicate conjunctions
    pub clauses: Vec<Vec<FilterPredicate>>,
    /// Search center
    pub center: GeoLocation,
    /// Search radius in meters
    pub radius_meters: u32,
    /// Server-side processing timeout hint in seconds
    pub timeout_secs: u32,
}

impl SpatialQuery {
    /// Render as an Overpass QL program requesting centroids and metadata
    pub fn to_overpass_ql(&self) -> String {
        let around = format!(
            "(around:{},{},{})",
            self.radius_meters,
            self.center.latitude(),
            self.center.longitude()
        );

        let mut ql = format!("[out:json][timeout:{}];\n(\n", self.timeout_secs);
        for clause in &self.clauses {
            let filters: String = clause.iter().map(render_predicate).collect();
            for kind in OsmType::all() {
                ql.push_str(&format!("  {kind}{filters}{around};\n"));
            }
        }
        ql.push_str(");\nout center meta;");
        ql
    }
}

/// Escape a value for an Overpass double-quoted string literal
fn escape_ql(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_predicate(predicate: &FilterPredicate) -> String {
    match predicate {
        FilterPredicate::Tag { key, value } => {
            format!("[\"{}\"=\"{}\"]", escape_ql(key), escape_ql(value))
        },
        FilterPredicate::NameMatches { text } => format!("[\"name\"~\"{}\",i]", escape_ql(text)),
    }
}

/// Builds [`SpatialQuery`] values under a combination policy
#[derive(Debug, Clone, Copy)]
pub struct SpatialQueryBuilder {
    combination: PredicateCombination,
    timeout_secs: u32,
}

impl Default for SpatialQueryBuilder {
    fn default() -> Self {
        Self::new(PredicateCombination::default(), DEFAULT_QUERY_TIMEOUT_SECS)
    }
}

impl SpatialQueryBuilder {
    /// Create a builder
    #[must_use]
    pub const fn new(combination: PredicateCombination, timeout_secs: u32) -> Self {
        Self {
            combination,
            timeout_secs,
        }
    }

    /// The combination policy in use
    #[must_use]
    pub const fn combination(&self) -> PredicateCombination {
        self.combination
    }

    /// Build a query for `filter` within `radius_meters` of `center`
    pub fn build(
        &self,
        filter: &CategoryFilter,
        center: GeoLocation,
        radius_meters: u32,
    ) -> SpatialQuery {
        let clauses = match (filter, self.combination) {
            (CategoryFilter::Structured(matches), PredicateCombination::AnyKeyword) => {
                let mut groups: Vec<Vec<FilterPredicate>> = Vec::new();
                for keyword in matches {
                    let mut group: Vec<FilterPredicate> = Vec::new();
                    for predicate in &keyword.predicates {
                        if !group.contains(predicate) {
                            group.push(predicate.clone());
                        }
                    }
                    if !groups.contains(&group) {
                        groups.push(group);
                    }
                }
                groups
            },
            _ => vec![filter.all_predicates()],
        };

        SpatialQuery {
            clauses,
            center,
            radius_meters,
            timeout_secs: self.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use domain::value_objects::KeywordMatch;

    use super::*;

    fn cafe_and_park() -> CategoryFilter {
        CategoryFilter::Structured(vec![
            KeywordMatch {
                keyword: "cafe".to_string(),
                predicates: vec![FilterPredicate::tag("amenity", "cafe")],
            },
            KeywordMatch {
                keyword: "cafetería".to_string(),
                predicates: vec![FilterPredicate::tag("amenity", "cafe")],
            },
            KeywordMatch {
                keyword: "parque".to_string(),
                predicates: vec![FilterPredicate::tag("leisure", "park")],
            },
        ])
    }

    #[test]
    fn renders_single_clause_query() {
        let filter = CategoryFilter::Structured(vec![KeywordMatch {
            keyword: "cafe".to_string(),
            predicates: vec![FilterPredicate::tag("amenity", "cafe")],
        }]);
        let query =
            SpatialQueryBuilder::default().build(&filter, GeoLocation::new_unchecked(40.4168, -3.7038), 1000);

        assert_eq!(
            query.to_overpass_ql(),
            "[out:json][timeout:25];\n(\n\
             \x20 node[\"amenity\"=\"cafe\"](around:1000,40.4168,-3.7038);\n\
             \x20 way[\"amenity\"=\"cafe\"](around:1000,40.4168,-3.7038);\n\
             \x20 relation[\"amenity\"=\"cafe\"](around:1000,40.4168,-3.7038);\n\
             );\nout center meta;"
        );
    }

    #[test]
    fn all_combination_conjoins_every_predicate() {
        let query = SpatialQueryBuilder::new(PredicateCombination::All, 25).build(
            &cafe_and_park(),
            GeoLocation::madrid(),
            500,
        );
        assert_eq!(
            query.clauses,
            vec![vec![
                FilterPredicate::tag("amenity", "cafe"),
                FilterPredicate::tag("leisure", "park"),
            ]]
        );
        let ql = query.to_overpass_ql();
        assert!(ql.contains("node[\"amenity\"=\"cafe\"][\"leisure\"=\"park\"](around:500,"));
        assert_eq!(ql.matches("node[").count(), 1);
    }

    #[test]
    fn any_keyword_combination_emits_one_clause_per_group() {
        let query = SpatialQueryBuilder::new(PredicateCombination::AnyKeyword, 25).build(
            &cafe_and_park(),
            GeoLocation::madrid(),
            500,
        );
        assert_eq!(
            query.clauses,
            vec![
                vec![FilterPredicate::tag("amenity", "cafe")],
                vec![FilterPredicate::tag("leisure", "park")],
            ]
        );
        let ql = query.to_overpass_ql();
        assert_eq!(ql.matches("node[").count(), 2);
        assert_eq!(ql.matches("relation[").count(), 2);
    }

    #[test]
    fn fuzzy_name_is_escaped() {
        let filter = CategoryFilter::FuzzyName("Bar \"El\" Tigre\\".to_string());
        let query = SpatialQueryBuilder::default().build(&filter, GeoLocation::madrid(), 1000);
        let ql = query.to_overpass_ql();
        assert!(ql.contains(r#"node["name"~"Bar \"El\" Tigre\\",i](around:1000,"#));
    }

    #[test]
    fn timeout_hint_is_configurable() {
        let filter = CategoryFilter::FuzzyName("x".to_string());
        let query = SpatialQueryBuilder::new(PredicateCombination::All, 60).build(
            &filter,
            GeoLocation::madrid(),
            10,
        );
        assert!(query.to_overpass_ql().starts_with("[out:json][timeout:60];"));
    }

    #[test]
    fn combination_serde_names() {
        let parsed: PredicateCombination = serde_json::from_str("\"any_keyword\"").unwrap();
        assert_eq!(parsed, PredicateCombination::AnyKeyword);
        assert_eq!(PredicateCombination::All.to_string(), "all");
    }
}

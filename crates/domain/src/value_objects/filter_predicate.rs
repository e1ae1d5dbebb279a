//! Filter predicates derived from a free-text category query

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single constraint on spatial features
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterPredicate {
    /// Exact tag match, e.g. `amenity=cafe`
    Tag {
        /// Tag key
        key: String,
        /// Required tag value
        value: String,
    },
    /// Case-insensitive fuzzy match against the feature's `name` tag
    NameMatches {
        /// Text the name must contain
        text: String,
    },
}

impl FilterPredicate {
    /// Create a tag predicate
    #[must_use]
    pub fn tag(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Tag {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a fuzzy name predicate
    #[must_use]
    pub fn name_matches(text: impl Into<String>) -> Self {
        Self::NameMatches { text: text.into() }
    }
}

impl fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag { key, value } => write!(f, "{key}={value}"),
            Self::NameMatches { text } => write!(f, "name~{text}"),
        }
    }
}

/// A dictionary keyword recognized in the query, with the predicates it implies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    /// The keyword that matched
    pub keyword: String,
    /// Predicates contributed by the keyword
    pub predicates: Vec<FilterPredicate>,
}

/// Interpretation of a category query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum CategoryFilter {
    /// One or more dictionary keywords matched
    Structured(Vec<KeywordMatch>),
    /// Nothing matched; search by name instead
    FuzzyName(String),
}

impl CategoryFilter {
    /// Every predicate in match order, duplicates removed
    #[must_use]
    pub fn all_predicates(&self) -> Vec<FilterPredicate> {
        match self {
            Self::Structured(matches) => {
                let mut out: Vec<FilterPredicate> = Vec::new();
                for predicate in matches.iter().flat_map(|m| m.predicates.iter()) {
                    if !out.contains(predicate) {
                        out.push(predicate.clone());
                    }
                }
                out
            },
            Self::FuzzyName(text) => vec![FilterPredicate::name_matches(text.clone())],
        }
    }

    /// Whether the query fell back to name matching
    #[must_use]
    pub const fn is_fuzzy(&self) -> bool {
        matches!(self, Self::FuzzyName(_))
    }
}

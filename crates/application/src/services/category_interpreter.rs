//! Category interpreter
//!
//! Maps a free-text place-type query ("cafetería cerca", "museum") to
//! structured tag predicates through a keyword dictionary. Matching is a
//! case-insensitive substring search using the Aho-Corasick algorithm, so
//! every keyword occurring anywhere in the query contributes its predicates.
//! Queries that match no keyword fall back to a fuzzy name search.

use aho_corasick::AhoCorasick;
use domain::value_objects::{CategoryFilter, FilterPredicate, KeywordMatch};
use tracing::debug;

use crate::error::ApplicationError;

/// Built-in keyword table: Spanish and English synonyms
pub const DEFAULT_KEYWORDS: &[(&str, &str, &str)] = &[
    ("cafe", "amenity", "cafe"),
    ("cafetería", "amenity", "cafe"),
    ("cafeteria", "amenity", "cafe"),
    ("restaurante", "amenity", "restaurant"),
    ("restaurant", "amenity", "restaurant"),
    ("biblioteca", "amenity", "library"),
    ("library", "amenity", "library"),
    ("parque", "leisure", "park"),
    ("park", "leisure", "park"),
    ("museo", "tourism", "museum"),
    ("museum", "tourism", "museum"),
    ("farmacia", "amenity", "pharmacy"),
    ("pharmacy", "amenity", "pharmacy"),
    ("hospital", "amenity", "hospital"),
    ("colegio", "amenity", "school"),
    ("school", "amenity", "school"),
    ("universidad", "amenity", "university"),
    ("university", "amenity", "university"),
    ("cine", "amenity", "cinema"),
    ("cinema", "amenity", "cinema"),
    ("teatro", "amenity", "theatre"),
    ("theatre", "amenity", "theatre"),
    ("gimnasio", "leisure", "fitness_centre"),
    ("gym", "leisure", "fitness_centre"),
    ("supermercado", "shop", "supermarket"),
    ("supermarket", "shop", "supermarket"),
    ("veterinaria", "amenity", "veterinary"),
    ("veterinario", "amenity", "veterinary"),
    ("veterinary", "amenity", "veterinary"),
    ("clínica veterinaria", "amenity", "veterinary"),
    ("clinica veterinaria", "amenity", "veterinary"),
];

/// One dictionary entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// Lowercase keyword
    pub keyword: String,
    /// Predicates the keyword implies
    pub predicates: Vec<FilterPredicate>,
}

/// Immutable keyword → predicate lookup table
#[derive(Debug, Clone)]
pub struct CategoryDictionary {
    entries: Vec<DictionaryEntry>,
    matcher: AhoCorasick,
}

impl CategoryDictionary {
    /// Build a dictionary from explicit entries
    ///
    /// Keywords are lowercased; blank keywords are ignored.
    pub fn new(entries: impl IntoIterator<Item = DictionaryEntry>) -> Result<Self, ApplicationError> {
        let entries: Vec<DictionaryEntry> = entries
            .into_iter()
            .map(|entry| DictionaryEntry {
                keyword: entry.keyword.trim().to_lowercase(),
                predicates: entry.predicates,
            })
            .filter(|entry| !entry.keyword.is_empty())
            .collect();

        let matcher = AhoCorasick::new(entries.iter().map(|e| e.keyword.as_str()))
            .map_err(|e| ApplicationError::Configuration(format!("keyword matcher: {e}")))?;

        Ok(Self { entries, matcher })
    }

    /// Number of keywords
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no keywords
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry whose keyword occurs in `query`, in dictionary order
    pub fn lookup(&self, query: &str) -> Vec<&DictionaryEntry> {
        let haystack = query.to_lowercase();
        let mut hits: Vec<usize> = self
            .matcher
            .find_overlapping_iter(&haystack)
            .map(|m| m.pattern().as_usize())
            .collect();
        hits.sort_unstable();
        hits.dedup();
        hits.into_iter()
            .filter_map(|index| self.entries.get(index))
            .collect()
    }
}

impl Default for CategoryDictionary {
    #[allow(clippy::expect_used)] // Infallible with valid static patterns
    fn default() -> Self {
        let entries = DEFAULT_KEYWORDS.iter().map(|(keyword, key, value)| DictionaryEntry {
            keyword: (*keyword).to_string(),
            predicates: vec![FilterPredicate::tag(*key, *value)],
        });
        Self::new(entries).expect("Failed to build keyword matcher")
    }
}

/// Translates category queries into filters
#[derive(Debug, Clone, Default)]
pub struct CategoryInterpreter {
    dictionary: CategoryDictionary,
}

impl CategoryInterpreter {
    /// Create an interpreter over an explicit dictionary
    #[must_use]
    pub const fn new(dictionary: CategoryDictionary) -> Self {
        Self { dictionary }
    }

    /// The dictionary in use
    #[must_use]
    pub const fn dictionary(&self) -> &CategoryDictionary {
        &self.dictionary
    }

    /// Interpret a query
    ///
    /// Every matching keyword contributes a [`KeywordMatch`]. Without any
    /// match the trimmed query becomes a fuzzy name filter.
    pub fn interpret(&self, query: &str) -> CategoryFilter {
        let matches: Vec<KeywordMatch> = self
            .dictionary
            .lookup(query)
            .into_iter()
            .map(|entry| KeywordMatch {
                keyword: entry.keyword.clone(),
                predicates: entry.predicates.clone(),
            })
            .collect();

        if matches.is_empty() {
            debug!(%query, "No category keyword matched, using name search");
            return CategoryFilter::FuzzyName(query.trim().to_string());
        }

        debug!(
            %query,
            keywords = ?matches.iter().map(|m| m.keyword.as_str()).collect::<Vec<_>>(),
            "Category keywords matched"
        );
        CategoryFilter::Structured(matches)
    }
}

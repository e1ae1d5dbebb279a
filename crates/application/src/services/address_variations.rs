//! Address variation generator
//!
//! Rewrites a free-text address into progressively simpler forms so that a
//! geocoder that rejects the full text may still resolve a nearby center.
//! The literal input is always tried last.

/// Country names stripped from the end of an address by default
pub const DEFAULT_COUNTRY_SUFFIXES: &[&str] = &["España", "Spain"];

/// Produces ordered, duplicate-free geocoding attempts for an address
#[derive(Debug, Clone)]
pub struct AddressVariationGenerator {
    country_suffixes: Vec<String>,
}

impl Default for AddressVariationGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY_SUFFIXES.iter().map(ToString::to_string))
    }
}

impl AddressVariationGenerator {
    /// Create a generator stripping the given trailing country names
    pub fn new(country_suffixes: impl IntoIterator<Item = String>) -> Self {
        Self {
            country_suffixes: country_suffixes
                .into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Generate variations, simplest first, ending with the trimmed input
    ///
    /// Empty or whitespace-only input yields an empty list.
    pub fn generate(&self, raw: &str) -> Vec<String> {
        let clean = raw.trim();
        if clean.is_empty() {
            return Vec::new();
        }

        let segments: Vec<&str> = clean
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        let mut out = Variations::new(clean);

        // City + region, then city alone
        let named: Vec<&str> = segments
            .iter()
            .copied()
            .filter(|s| !is_numeric(s))
            .collect();
        if let [.., city, region] = named.as_slice() {
            out.push(format!("{city}, {region}"));
            out.push((*city).to_string());
        }

        // Without postal codes
        if segments.iter().skip(1).any(|s| is_numeric(s)) {
            let kept: Vec<&str> = segments
                .iter()
                .enumerate()
                .filter(|(i, s)| *i == 0 || !is_numeric(s))
                .map(|(_, s)| *s)
                .collect();
            out.push(kept.join(", "));
        }

        // Without trailing country
        if let Some(idx) = clean.rfind(',') {
            let (head, tail) = clean.split_at(idx);
            if self.is_country(tail.trim_start_matches(',').trim()) {
                out.push(head.trim().to_string());
            }
        }

        // Without house number
        if let Some(stripped) = strip_leading_house_number(clean) {
            out.push(stripped);
        }

        // Street + city
        if let Some((street, rest)) = segments.split_first() {
            let city = rest.iter().find(|s| {
                !is_numeric(s) && !self.is_country(s) && s.chars().count() > 2 && *s != street
            });
            if let Some(city) = city {
                out.push(format!("{street}, {city}"));
            }
        }

        out.finish()
    }

    fn is_country(&self, segment: &str) -> bool {
        let lower = segment.to_lowercase();
        self.country_suffixes.iter().any(|c| *c == lower)
    }
}

/// Generate variations with the default country list
pub fn generate_address_variations(raw: &str) -> Vec<String> {
    AddressVariationGenerator::default().generate(raw)
}

/// Ordered set that keeps the original input for the final slot
struct Variations<'a> {
    original: &'a str,
    items: Vec<String>,
}

impl<'a> Variations<'a> {
    const fn new(original: &'a str) -> Self {
        Self {
            original,
            items: Vec::new(),
        }
    }

    fn push(&mut self, candidate: String) {
        let candidate = candidate.trim();
        if candidate.is_empty() || candidate == self.original {
            return;
        }
        if !self.items.iter().any(|existing| existing == candidate) {
            self.items.push(candidate.to_string());
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.items.push(self.original.to_string());
        self.items
    }
}

/// A standalone run of digits (house number, postal code)
fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}

/// Reduce a leading `"<street> <number>"` to `"<street>"`
///
/// Matches the first whitespace run (after at least one character) that is
/// followed by digits, and removes both.
fn strip_leading_house_number(text: &str) -> Option<String> {
    for (start, ch) in text.char_indices().skip(1) {
        if !ch.is_whitespace() {
            continue;
        }
        let after_space = text[start..].trim_start();
        let digits = after_space
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(after_space.len(), |(i, _)| i);
        if digits == 0 {
            continue;
        }

        let rest = &after_space[digits..];
        let reduced = format!("{}{rest}", &text[..start]);
        let reduced = reduced.trim().trim_end_matches(',').trim_end();
        return (!reduced.is_empty()).then(|| reduced.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_spanish_address() {
        let variations = generate_address_variations("Calle Mayor 5, Madrid, 28013, España");
        assert_eq!(
            variations,
            vec![
                "Madrid, España",
                "Madrid",
                "Calle Mayor 5, Madrid, España",
                "Calle Mayor 5, Madrid, 28013",
                "Calle Mayor, Madrid, 28013, España",
                "Calle Mayor 5, Madrid",
                "Calle Mayor 5, Madrid, 28013, España",
            ]
        );
    }

    #[test]
    fn city_variations_come_first() {
        let variations = generate_address_variations("Gran Vía 1, Madrid, Comunidad de Madrid");
        assert_eq!(variations[0], "Madrid, Comunidad de Madrid");
        assert_eq!(variations[1], "Madrid");
    }

    #[test]
    fn single_segment_without_number() {
        assert_eq!(generate_address_variations("  Sevilla  "), vec!["Sevilla"]);
    }

    #[test]
    fn single_segment_with_number() {
        assert_eq!(
            generate_address_variations("Calle Alcalá 42"),
            vec!["Calle Alcalá", "Calle Alcalá 42"]
        );
    }

    #[test]
    fn original_stays_last_when_a_rule_reproduces_it() {
        let variations = generate_address_variations("Madrid, España");
        assert_eq!(variations, vec!["Madrid", "Madrid, España"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(generate_address_variations("").is_empty());
        assert_eq!(generate_address_variations("  ,  "), vec![","]);
    }

    #[test]
    fn country_suffix_is_case_insensitive() {
        let variations = generate_address_variations("Plaza Mayor, Salamanca, ESPAÑA");
        assert!(variations.contains(&"Plaza Mayor, Salamanca".to_string()));
    }

    #[test]
    fn custom_country_list() {
        let generator = AddressVariationGenerator::new(vec!["France".to_string()]);
        let variations = generator.generate("Rue de Rivoli, Paris, France");
        assert!(variations.contains(&"Rue de Rivoli, Paris".to_string()));
    }

    #[test]
    fn strip_house_number_rules() {
        assert_eq!(
            strip_leading_house_number("Calle Mayor 5, Madrid").as_deref(),
            Some("Calle Mayor, Madrid")
        );
        assert_eq!(strip_leading_house_number("Madrid"), None);
        assert_eq!(strip_leading_house_number("28013 Madrid"), None);
        assert_eq!(
            strip_leading_house_number("Madrid, 28013").as_deref(),
            Some("Madrid")
        );
    }

    #[test]
    fn street_city_skips_short_segments() {
        let variations = generate_address_variations("Calle Luna 3, Ol, Getafe");
        assert!(variations.contains(&"Calle Luna 3, Getafe".to_string()));
    }
}

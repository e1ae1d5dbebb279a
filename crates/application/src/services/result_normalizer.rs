//! Result normalizer
//!
//! Converts raw backend features into [`Place`] entities: picks a display
//! name, a category, an address assembled from `addr:*` tags and a phone
//! number, and measures the distance from the search center.

use std::collections::{BTreeMap, HashSet};

use domain::entities::{Place, UNNAMED_PLACE};
use domain::value_objects::{GeoLocation, OsmRef, OsmType};
use tracing::debug;

use crate::ports::RawFeature;

/// Generic category when no type tag is present
pub const GENERIC_PLACE_TYPE: &str = "place";

const TYPE_KEYS: &[&str] = &["amenity", "leisure", "tourism", "shop", "building"];
const PHONE_KEYS: &[&str] = &["phone", "contact:phone", "addr:phone", "contact:mobile"];
const LOCALITY_KEYS: &[&str] = &["addr:city", "addr:municipality", "addr:town", "addr:village"];
const AREA_KEYS: &[&str] = &["addr:suburb", "addr:district", "addr:province"];

/// Converts raw features into places
#[derive(Debug, Clone)]
pub struct ResultNormalizer {
    name_language: String,
    alternate_name_language: String,
}

impl Default for ResultNormalizer {
    fn default() -> Self {
        Self::new("es", "en")
    }
}

impl ResultNormalizer {
    /// Create a normalizer preferring `name:<name_language>`, then `name`,
    /// then `name:<alternate_name_language>`
    pub fn new(name_language: impl Into<String>, alternate_name_language: impl Into<String>) -> Self {
        Self {
            name_language: name_language.into(),
            alternate_name_language: alternate_name_language.into(),
        }
    }

    /// Normalize every usable feature
    ///
    /// Features with an unknown kind or without coordinates are skipped, and
    /// a repeated `(osm_type, osm_id)` keeps its first occurrence. Output
    /// order follows input order.
    pub fn normalize(&self, features: Vec<RawFeature>, center: GeoLocation) -> Vec<Place> {
        let total = features.len();
        let mut seen: HashSet<OsmRef> = HashSet::with_capacity(total);
        let mut places = Vec::with_capacity(total);

        for feature in features {
            let Ok(osm_type) = feature.kind.parse::<OsmType>() else {
                debug!(kind = %feature.kind, id = feature.id, "Skipping feature of unknown kind");
                continue;
            };
            let Some(position) = feature.position() else {
                debug!(%osm_type, id = feature.id, "Skipping feature without coordinates");
                continue;
            };
            let key = OsmRef::new(osm_type, feature.id);
            if !seen.insert(key) {
                continue;
            }

            places.push(self.to_place(key, position, feature.tags, center));
        }

        debug!(total, kept = places.len(), "Normalized features");
        places
    }

    fn to_place(
        &self,
        key: OsmRef,
        position: GeoLocation,
        tags: BTreeMap<String, String>,
        center: GeoLocation,
    ) -> Place {
        let name = self.pick_name(&tags);
        let place_type = pick_type(&tags);
        let address = build_address(&tags);
        let phone = first_tag(&tags, PHONE_KEYS).map(ToString::to_string);
        let display_name = address.clone().unwrap_or_else(|| name.clone());

        Place {
            name,
            lat: position.latitude(),
            lng: position.longitude(),
            place_type,
            address,
            phone,
            osm_id: key.osm_id,
            osm_type: key.osm_type,
            osm_url: key.url(),
            display_name,
            distance_meters: center.distance_meters(&position),
            tags,
        }
    }

    fn pick_name(&self, tags: &BTreeMap<String, String>) -> String {
        let localized = format!("name:{}", self.name_language);
        let alternate = format!("name:{}", self.alternate_name_language);
        first_tag(tags, &[localized.as_str(), "name", alternate.as_str(), "ref"])
            .map_or_else(|| UNNAMED_PLACE.to_string(), ToString::to_string)
    }
}

/// First non-blank value among `keys`, trimmed
fn first_tag<'a>(tags: &'a BTreeMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| tags.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

fn pick_type(tags: &BTreeMap<String, String>) -> String {
    let building = first_tag(tags, &["building"]);
    let worship = tags
        .get("amenity")
        .is_some_and(|amenity| amenity.trim() == "place_of_worship");

    if let (Some(building), true) = (building, worship) {
        return building.to_string();
    }

    first_tag(tags, TYPE_KEYS).map_or_else(|| GENERIC_PLACE_TYPE.to_string(), ToString::to_string)
}

/// Assemble an address from `addr:*` tags, first non-empty tier wins
fn build_address(tags: &BTreeMap<String, String>) -> Option<String> {
    let street = first_tag(tags, &["addr:street"]).map(|street| {
        match first_tag(tags, &["addr:housenumber"]) {
            Some(number) => format!("{street} {number}"),
            None => street.to_string(),
        }
    });
    let location = street.or_else(|| first_tag(tags, &["addr:place"]).map(ToString::to_string));
    let locality = first_tag(tags, LOCALITY_KEYS).map(ToString::to_string);

    let primary: Vec<String> = [location, locality].into_iter().flatten().collect();
    if !primary.is_empty() {
        return Some(primary.join(", "));
    }

    let secondary: Vec<&str> = AREA_KEYS
        .iter()
        .filter_map(|key| first_tag(tags, &[*key]))
        .collect();
    (!secondary.is_empty()).then(|| secondary.join(", "))
}

//! Static lookup tables: city → country and country → region.
//!
//! The built-in tables cover the default city list. Deployments extend them
//! through `extra_city_countries` / `extra_country_regions` in
//! [`crate::AppConfig`] instead of editing merge code.

use std::collections::{BTreeMap, HashMap};

pub const AMERICAS: &str = "Americas";
pub const EUROPE: &str = "Europe";
pub const ASIA: &str = "Asia";
pub const AFRICA: &str = "Africa";
pub const OCEANIA: &str = "Oceania";
pub const OTHER: &str = "Other";

/// Cities requested when the caller does not supply a list.
pub const DEFAULT_CITIES: [&str; 19] = [
    "Zurich",
    "Paris",
    "Berlin",
    "Sydney",
    "Amsterdam",
    "Seoul",
    "Dubai",
    "Toronto",
    "Tokyo",
    "London",
    "New York",
    "Hong Kong",
    "Barcelona",
    "Johannesburg",
    "Singapore",
    "Prague",
    "Lisbon",
    "Bangkok",
    "Mexico City",
];

const CITY_COUNTRY: &[(&str, &str)] = &[
    ("Zurich", "Switzerland"),
    ("Paris", "France"),
    ("Berlin", "Germany"),
    ("Sydney", "Australia"),
    ("Amsterdam", "Netherlands"),
    ("Seoul", "South Korea"),
    ("Dubai", "United Arab Emirates"),
    ("Toronto", "Canada"),
    ("Tokyo", "Japan"),
    ("London", "United Kingdom"),
    ("New York", "United States"),
    ("Hong Kong", "Hong Kong"),
    ("Barcelona", "Spain"),
    ("Johannesburg", "South Africa"),
    ("Singapore", "Singapore"),
    ("Prague", "Czech Republic"),
    ("Lisbon", "Portugal"),
    ("Bangkok", "Thailand"),
    ("Mexico City", "Mexico"),
];

const COUNTRY_REGION: &[(&str, &str)] = &[
    ("Switzerland", EUROPE),
    ("France", EUROPE),
    ("Germany", EUROPE),
    ("Australia", OCEANIA),
    ("Netherlands", EUROPE),
    ("South Korea", ASIA),
    ("United Arab Emirates", ASIA),
    ("Canada", AMERICAS),
    ("Japan", ASIA),
    ("United Kingdom", EUROPE),
    ("United States", AMERICAS),
    ("United States of America", AMERICAS),
    ("USA", AMERICAS),
    ("U.S.", AMERICAS),
    ("US", AMERICAS),
    ("Hong Kong", ASIA),
    ("Spain", EUROPE),
    ("South Africa", AFRICA),
    ("Singapore", ASIA),
    ("Czech Republic", EUROPE),
    ("Czechia", EUROPE),
    ("Portugal", EUROPE),
    ("Thailand", ASIA),
    ("Mexico", AMERICAS),
];

/// Immutable lookup tables used by the merge step.
#[derive(Debug, Clone)]
pub struct GeoTables {
    city_country: HashMap<String, String>,
    country_region: HashMap<String, String>,
}

impl Default for GeoTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl GeoTables {
    /// Tables covering the default city list.
    pub fn builtin() -> Self {
        Self {
            city_country: to_map(CITY_COUNTRY),
            country_region: to_map(COUNTRY_REGION),
        }
    }

    /// Built-in tables with caller-supplied entries layered on top.
    pub fn with_overrides(
        extra_city_countries: &BTreeMap<String, String>, extra_country_regions: &BTreeMap<String, String>,
    ) -> Self {
        let mut tables = Self::builtin();
        tables
            .city_country
            .extend(extra_city_countries.iter().map(|(k, v)| (k.clone(), v.clone())));
        tables
            .country_region
            .extend(extra_country_regions.iter().map(|(k, v)| (k.clone(), v.clone())));
        tables
    }

    /// Country for a city, or `None` when the city is not in the table.
    pub fn country_for(&self, city: &str) -> Option<&str> {
        self.city_country.get(city.trim()).map(String::as_str)
    }

    /// Region for a country, or `None` when the country is not in the table.
    pub fn region_for(&self, country: &str) -> Option<&str> {
        self.country_region.get(country.trim()).map(String::as_str)
    }
}

fn to_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
}

/// Map free-text region labels onto the five canonical regions.
///
/// Returns `None` when no keyword matches.
pub fn canonical_region(label: &str) -> Option<&'static str> {
    let t = label.trim().to_lowercase();
    if t.contains("amer") {
        Some(AMERICAS)
    } else if t.contains("euro") {
        Some(EUROPE)
    } else if t.contains("asia") {
        Some(ASIA)
    } else if t.contains("afri") {
        Some(AFRICA)
    } else if t.contains("ocea") || t.contains("austral") {
        Some(OCEANIA)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_default_city_has_a_country_and_region() {
        let geo = GeoTables::builtin();
        for city in DEFAULT_CITIES {
            let country = geo.country_for(city).unwrap();
            assert!(geo.region_for(country).is_some(), "{country} has no region");
        }
    }

    #[test]
    fn test_unknown_city() {
        assert_eq!(GeoTables::builtin().country_for("Atlantis"), None);
    }

    #[test]
    fn test_overrides_extend_and_replace() {
        let cities = BTreeMap::from([("Tbilisi".to_string(), "Georgia".to_string())]);
        let regions = BTreeMap::from([("Georgia".to_string(), "Europe".to_string())]);
        let geo = GeoTables::with_overrides(&cities, &regions);
        assert_eq!(geo.country_for("Tbilisi"), Some("Georgia"));
        assert_eq!(geo.region_for("Georgia"), Some("Europe"));
        assert_eq!(geo.country_for("Paris"), Some("France"));
    }

    #[test]
    fn test_canonical_region() {
        assert_eq!(canonical_region("North America"), Some(AMERICAS));
        assert_eq!(canonical_region("  western EUROPE "), Some(EUROPE));
        assert_eq!(canonical_region("Southeast Asia"), Some(ASIA));
        assert_eq!(canonical_region("Sub-Saharan Africa"), Some(AFRICA));
        assert_eq!(canonical_region("Australasia"), Some(ASIA));
        assert_eq!(canonical_region("Australia"), Some(OCEANIA));
        assert_eq!(canonical_region("Antarctica"), None);
    }
}

//! Merge the city-level cost table with the country-level visa and speed
//! tables, then enrich with regions and the home-country visa override.

use crate::dataset::{Dataset, mean_present};
use crate::geo::{self, GeoTables};
use crate::model::CombinedRecord;

/// The traveller's own country, which never requires a visa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeCountry {
    pub name: String,
    pub aliases: Vec<String>,
}

impl Default for HomeCountry {
    fn default() -> Self {
        Self {
            name: "United States".into(),
            aliases: vec!["United States of America".into(), "USA".into(), "US".into()],
        }
    }
}

impl HomeCountry {
    pub fn new(name: impl Into<String>, aliases: Vec<String>) -> Self {
        Self { name: name.into(), aliases }
    }

    pub fn matches(&self, country: &str) -> bool {
        let country = country.trim();
        std::iter::once(&self.name)
            .chain(&self.aliases)
            .any(|candidate| candidate.trim().eq_ignore_ascii_case(country))
    }
}

/// Build the combined table, one row per cost row, in cost-table order.
///
/// Scores are not computed here; see [`crate::scoring::score`].
pub fn merge(dataset: &Dataset, geo: &GeoTables, home: &HomeCountry) -> Vec<CombinedRecord> {
    let visa_free = dataset.visa_free_countries();
    let mut unmapped = 0usize;
    let mut without_speed = 0usize;

    let mut records: Vec<CombinedRecord> = dataset
        .costs
        .iter()
        .map(|cost| {
            let mut record = CombinedRecord::from_cost(cost);
            record.country = geo.country_for(&cost.city).map(str::to_string);

            match record.country.as_deref() {
                Some(country) => {
                    record.visa_free = visa_free.contains(country);
                    if let Some(speed) = dataset.speeds.get(country) {
                        record.mobile_mbps = speed.mobile_mbps;
                        record.fixed_mbps = speed.fixed_mbps;
                    }
                }
                None => unmapped += 1,
            }

            record.avg_internet_mbps = mean_present(&[record.mobile_mbps, record.fixed_mbps]);
            if record.avg_internet_mbps.is_none() {
                without_speed += 1;
            }
            record
        })
        .collect();

    tracing::debug!(
        rows = records.len(),
        visa_free_countries = visa_free.len(),
        unmapped_cities = unmapped,
        rows_without_speed = without_speed,
        "merged datasets"
    );

    enrich(&mut records, geo, home);
    records
}

/// Region resolution followed by the home-country override.
///
/// Safe to run repeatedly; adopted snapshots go through it again.
pub fn enrich(records: &mut [CombinedRecord], geo: &GeoTables, home: &HomeCountry) {
    ensure_regions(records, geo);
    apply_home_override(records, home);
}

/// Give every row one of the canonical regions, or "Other".
///
/// Blank regions come from the country lookup. Free-text regions are mapped
/// by keyword, falling back to the country lookup, then to "Other".
pub fn ensure_regions(records: &mut [CombinedRecord], geo: &GeoTables) {
    for record in records.iter_mut() {
        let from_country = || {
            record
                .country
                .as_deref()
                .and_then(|c| geo.region_for(c))
                .and_then(|r| geo::canonical_region(r).or(Some(r)))
        };

        let resolved = match record.region.as_deref().map(str::trim) {
            Some(existing) if !existing.is_empty() => geo::canonical_region(existing).or_else(from_country),
            _ => from_country(),
        }
        .unwrap_or(geo::OTHER)
        .to_string();

        record.region = Some(resolved);
    }
}

/// Force `visa_free` for rows in the home country.
pub fn apply_home_override(records: &mut [CombinedRecord], home: &HomeCountry) {
    let mut flipped = 0usize;
    for record in records.iter_mut() {
        if record.country.as_deref().is_some_and(|c| home.matches(c)) {
            if !record.visa_free {
                flipped += 1;
            }
            record.visa_free = true;
        }
    }
    if flipped > 0 {
        tracing::debug!(home = %home.name, flipped, "applied home-country visa override");
    }
}

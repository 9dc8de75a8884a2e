//! Read-only views of the combined table for browsing the raw inputs.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::dataset::mean_present;
use crate::model::CombinedRecord;

/// Cost columns of one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CostOfLivingRow {
    pub city: String,
    pub country: Option<String>,
    pub rent: Option<f64>,
    pub utilities: Option<f64>,
    pub internet_flat_fee: Option<f64>,
    pub transport: Option<f64>,
    pub food_estimate: Option<f64>,
    pub monthly_cost: Option<f64>,
    pub source: Option<String>,
}

/// Speeds of one country, averaged over the cities in the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CountrySpeedRow {
    pub country: String,
    pub mobile_mbps: Option<f64>,
    pub fixed_mbps: Option<f64>,
    pub avg_internet_mbps: Option<f64>,
}

fn matches(haystack: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim).filter(|n| !n.is_empty()) {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

/// Cost rows whose city contains `query` (case-insensitive), in table order.
pub fn cost_of_living(records: &[CombinedRecord], query: Option<&str>) -> Vec<CostOfLivingRow> {
    records
        .iter()
        .filter(|r| matches(&r.city, query))
        .map(|r| CostOfLivingRow {
            city: r.city.clone(),
            country: r.country.clone(),
            rent: r.rent,
            utilities: r.utilities,
            internet_flat_fee: r.internet_flat_fee,
            transport: r.transport,
            food_estimate: r.food_estimate,
            monthly_cost: r.monthly_cost,
            source: r.source.clone(),
        })
        .collect()
}

/// Per-country speeds, filtered by country substring and sorted by country.
///
/// Rows without a country are skipped.
pub fn internet_speeds(records: &[CombinedRecord], query: Option<&str>) -> Vec<CountrySpeedRow> {
    let mut grouped: BTreeMap<&str, (Vec<Option<f64>>, Vec<Option<f64>>)> = BTreeMap::new();
    for record in records {
        let Some(country) = record.country.as_deref() else {
            continue;
        };
        if !matches(country, query) {
            continue;
        }
        let entry = grouped.entry(country).or_default();
        entry.0.push(record.mobile_mbps);
        entry.1.push(record.fixed_mbps);
    }

    grouped
        .into_iter()
        .map(|(country, (mobile, fixed))| {
            let mobile_mbps = mean_present(&mobile);
            let fixed_mbps = mean_present(&fixed);
            CountrySpeedRow {
                country: country.to_string(),
                mobile_mbps,
                fixed_mbps,
                avg_internet_mbps: mean_present(&[mobile_mbps, fixed_mbps]),
            }
        })
        .collect()
}

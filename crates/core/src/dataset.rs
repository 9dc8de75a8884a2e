//! Per-source normalisation ahead of the merge.

use std::collections::{BTreeMap, HashSet};

use crate::model::{CostRow, SpeedTables, VisaCategories, VisaRecord};

/// Mobile and fixed speed for one country after the outer join.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CountrySpeed {
    pub mobile_mbps: Option<f64>,
    pub fixed_mbps: Option<f64>,
}

impl CountrySpeed {
    /// Mean of whichever speeds are present; `None` when neither is.
    pub fn average(&self) -> Option<f64> {
        mean_present(&[self.mobile_mbps, self.fixed_mbps])
    }
}

/// The three normalised source tables.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub visa_categories: VisaCategories,
    pub visa_records: Vec<VisaRecord>,
    pub costs: Vec<CostRow>,
    pub speeds: BTreeMap<String, CountrySpeed>,
}

impl Dataset {
    pub fn build(visa_categories: VisaCategories, costs: Vec<CostRow>, speeds: SpeedTables) -> Self {
        let visa_records = load_visa(&visa_categories);
        let costs = load_costs(costs);
        let speeds = load_speeds(speeds);

        tracing::debug!(
            visa_records = visa_records.len(),
            cost_rows = costs.len(),
            speed_countries = speeds.len(),
            "dataset loaded"
        );

        Self { visa_categories, visa_records, costs, speeds }
    }

    /// Union of the countries listed under any visa-free category.
    pub fn visa_free_countries(&self) -> HashSet<&str> {
        self.visa_records
            .iter()
            .filter(|r| r.visa_free)
            .map(|r| r.country.as_str())
            .collect()
    }
}

/// Flatten the category map into one record per (country, category) pair.
pub fn load_visa(categories: &VisaCategories) -> Vec<VisaRecord> {
    categories
        .iter()
        .flat_map(|(category, countries)| {
            countries
                .iter()
                .map(move |country| VisaRecord::classify(country.clone(), category.clone()))
        })
        .collect()
}

/// Fill in `monthly_cost` for every row.
pub fn load_costs(mut rows: Vec<CostRow>) -> Vec<CostRow> {
    for row in &mut rows {
        row.monthly_cost = Some(monthly_cost(row));
    }
    rows
}

/// Sum of the five components, counting a missing component as zero.
///
/// This understates the true cost of a city with unresolved fields; the
/// missing components stay visible as `None` on the row.
pub fn monthly_cost(row: &CostRow) -> f64 {
    row.components().iter().map(|c| c.unwrap_or(0.0)).sum()
}

/// Outer-join the mobile and fixed tables into one entry per country.
///
/// Values are carried over unchanged. When a country appears more than once
/// in a table the first row wins.
pub fn load_speeds(tables: SpeedTables) -> BTreeMap<String, CountrySpeed> {
    let mut joined: BTreeMap<String, CountrySpeed> = BTreeMap::new();

    for row in tables.mobile {
        let entry = joined.entry(row.country.trim().to_string()).or_default();
        if entry.mobile_mbps.is_none() {
            entry.mobile_mbps = row.mbps;
        }
    }
    for row in tables.fixed {
        let entry = joined.entry(row.country.trim().to_string()).or_default();
        if entry.fixed_mbps.is_none() {
            entry.fixed_mbps = row.mbps;
        }
    }

    joined
}

pub(crate) fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().filter(|v| v.is_finite()).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

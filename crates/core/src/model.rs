//! Row types for the three upstream datasets and the combined table.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::sources::CostRowStatus;

/// Visa category label → countries listed under it.
pub type VisaCategories = BTreeMap<String, Vec<String>>;

/// Monthly cost components for one requested city, in USD.
///
/// Any metric may be `None` when the source page could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CostRow {
    pub city: String,
    /// One-bedroom apartment in the city centre.
    pub rent: Option<f64>,
    /// Basic utilities for an 85 m² apartment.
    pub utilities: Option<f64>,
    /// Flat-rate home internet plan.
    pub internet_flat_fee: Option<f64>,
    /// Monthly public transport pass.
    pub transport: Option<f64>,
    /// Estimated monthly grocery basket.
    pub food_estimate: Option<f64>,
    /// Sum of the five components; set by [`crate::dataset::load_costs`].
    pub monthly_cost: Option<f64>,
    /// Page the metrics were read from.
    pub source: String,
    pub status: CostRowStatus,
}

impl CostRow {
    /// A row with no metrics, recording why the city could not be resolved.
    pub fn failed(city: impl Into<String>, source: impl Into<String>, status: CostRowStatus) -> Self {
        Self {
            city: city.into(),
            rent: None,
            utilities: None,
            internet_flat_fee: None,
            transport: None,
            food_estimate: None,
            monthly_cost: None,
            source: source.into(),
            status,
        }
    }

    /// The five monthly components in a fixed order.
    pub fn components(&self) -> [Option<f64>; 5] {
        [self.rent, self.utilities, self.internet_flat_fee, self.transport, self.food_estimate]
    }
}

/// One (country, category) pair from the visa source, with keyword flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VisaRecord {
    pub country: String,
    pub visa_category: String,
    pub visa_free: bool,
    pub visa_on_arrival: bool,
    pub eta_required: bool,
    pub evisa_required: bool,
    pub visa_required: bool,
}

impl VisaRecord {
    /// Classify a category label by case-insensitive keyword matching.
    pub fn classify(country: impl Into<String>, category: impl Into<String>) -> Self {
        let visa_category = category.into();
        let label = visa_category.to_lowercase();
        Self {
            country: country.into(),
            visa_free: label.contains("visa-free"),
            visa_on_arrival: label.contains("visa on arrival"),
            eta_required: label.contains("eta") || label.contains("electronic"),
            evisa_required: label.contains("e-visa"),
            visa_required: label.contains("requiring visas"),
            visa_category,
        }
    }
}

/// Median download speed for one country and connection type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpeedRow {
    pub country: String,
    pub mbps: Option<f64>,
}

/// Per-country speed tables, one per connection type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpeedTables {
    pub mobile: Vec<SpeedRow>,
    pub fixed: Vec<SpeedRow>,
}

/// Sub-scores and the weighted composite for one combined row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreCard {
    /// 100 when visa-free, 50 otherwise.
    pub visa_score: f64,
    /// Inverse min-max normalised monthly cost; `None` when the cost is unknown.
    pub cost_score: Option<f64>,
    /// Speed relative to the fastest row; `None` when the speed is unknown.
    pub speed_score: Option<f64>,
    /// Weighted sum of the three sub-scores; `None` if any sub-score is.
    pub nomad_score: Option<f64>,
}

/// One destination city in the merged, enriched and scored table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CombinedRecord {
    pub city: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub rent: Option<f64>,
    pub utilities: Option<f64>,
    pub internet_flat_fee: Option<f64>,
    pub transport: Option<f64>,
    pub food_estimate: Option<f64>,
    pub monthly_cost: Option<f64>,
    pub source: Option<String>,
    pub mobile_mbps: Option<f64>,
    pub fixed_mbps: Option<f64>,
    pub avg_internet_mbps: Option<f64>,
    pub visa_free: bool,
    pub scores: Option<ScoreCard>,
}

impl CombinedRecord {
    /// Start a combined row from a cost row; country-level fields stay empty.
    pub fn from_cost(row: &CostRow) -> Self {
        Self {
            city: row.city.clone(),
            country: None,
            region: None,
            rent: row.rent,
            utilities: row.utilities,
            internet_flat_fee: row.internet_flat_fee,
            transport: row.transport,
            food_estimate: row.food_estimate,
            monthly_cost: row.monthly_cost,
            source: Some(row.source.clone()),
            mobile_mbps: None,
            fixed_mbps: None,
            avg_internet_mbps: None,
            visa_free: false,
            scores: None,
        }
    }

    pub fn nomad_score(&self) -> Option<f64> {
        self.scores.and_then(|s| s.nomad_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_visa_free() {
        let rec = VisaRecord::classify("Japan", "Visa-free countries");
        assert!(rec.visa_free);
        assert!(!rec.visa_on_arrival);
        assert!(!rec.visa_required);
    }

    #[test]
    fn test_classify_eta_and_electronic() {
        assert!(VisaRecord::classify("Canada", "ETA required").eta_required);
        assert!(VisaRecord::classify("Kenya", "Electronic travel authorisation").eta_required);
        assert!(VisaRecord::classify("India", "E-visa destinations").evisa_required);
    }

    #[test]
    fn test_classify_requiring_visas() {
        let rec = VisaRecord::classify("Russia", "Countries requiring visas");
        assert!(rec.visa_required);
        assert!(!rec.visa_free);
    }

    #[test]
    fn test_failed_cost_row_has_no_metrics() {
        let row = CostRow::failed("Paris", "https://example.com/paris", CostRowStatus::RateLimited);
        assert!(row.components().iter().all(Option::is_none));
        assert_eq!(row.monthly_cost, None);
    }
}

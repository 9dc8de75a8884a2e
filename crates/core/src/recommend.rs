//! Budget/speed/visa/region filter and top-N ranking.

use std::cmp::Ordering;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::model::CombinedRecord;

pub const DEFAULT_MIN_SPEED: f64 = 25.0;
pub const DEFAULT_TOP_N: usize = 100;

/// Region value that disables region filtering.
pub const GLOBAL_REGION: &str = "Global";

/// Constraints for one recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationQuery {
    /// Maximum monthly cost in USD; must be positive.
    pub max_budget: f64,
    /// Minimum average internet speed in Mbps; 0 disables the filter.
    #[serde(default = "default_min_speed")]
    pub min_speed: f64,
    #[serde(default = "default_true")]
    pub visa_free_only: bool,
    /// Region name; blank or "Global" disables the filter.
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_min_speed() -> f64 {
    DEFAULT_MIN_SPEED
}

fn default_true() -> bool {
    true
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl RecommendationQuery {
    pub fn new(max_budget: f64) -> Self {
        Self {
            max_budget,
            min_speed: DEFAULT_MIN_SPEED,
            visa_free_only: true,
            region: None,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// The region to filter on, or `None` for a global query.
    pub fn region_filter(&self) -> Option<&str> {
        self.region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty() && !r.eq_ignore_ascii_case(GLOBAL_REGION))
    }

    /// Reject queries that cannot match anything meaningful.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.max_budget.is_finite() && self.max_budget > 0.0) {
            return Err(Error::InvalidInput(format!(
                "max_budget must be a positive amount, got {}",
                self.max_budget
            )));
        }
        if !self.min_speed.is_finite() {
            return Err(Error::InvalidInput("min_speed must be a finite number".into()));
        }
        Ok(())
    }
}

/// Raw filter values as a form submits them.
///
/// Only basic coercion happens here; anything that does not parse falls back
/// to a default or is rejected by [`RecommendationQuery`] validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationFilters {
    /// Budget text, e.g. `"$2,000"`.
    pub budget: String,
    /// Minimum download speed text; blank means 25 Mbps.
    #[serde(default)]
    pub min_speed: Option<String>,
    #[serde(default)]
    pub visa_free_only: Option<bool>,
    #[serde(default)]
    pub region: Option<String>,
}

impl RecommendationFilters {
    pub fn to_query(&self) -> RecommendationQuery {
        let min_speed = self
            .min_speed
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|s| s.is_finite() && *s != 0.0)
            .unwrap_or(DEFAULT_MIN_SPEED);
        let region = self
            .region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        RecommendationQuery {
            max_budget: parse_budget(&self.budget),
            min_speed,
            visa_free_only: self.visa_free_only.unwrap_or(true),
            region,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Parse a possibly messy budget string into USD, keeping only digits, `.` and `-`.
///
/// Unparseable input yields 0, which validation then rejects.
pub fn parse_budget(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

/// One ranked destination, numeric fields rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recommendation {
    pub city: String,
    pub country: Option<String>,
    pub nomad_score: Option<f64>,
    pub monthly_cost: Option<f64>,
    pub avg_internet_mbps: Option<f64>,
    pub visa_free: bool,
    pub rent: Option<f64>,
    pub internet_flat_fee: Option<f64>,
    pub transport: Option<f64>,
}

impl From<&CombinedRecord> for Recommendation {
    fn from(r: &CombinedRecord) -> Self {
        Self {
            city: r.city.clone(),
            country: r.country.clone(),
            nomad_score: r.nomad_score().map(round2),
            monthly_cost: r.monthly_cost.map(round2),
            avg_internet_mbps: r.avg_internet_mbps.map(round2),
            visa_free: r.visa_free,
            rent: r.rent.map(round2),
            internet_flat_fee: r.internet_flat_fee.map(round2),
            transport: r.transport.map(round2),
        }
    }
}

/// Filter the scored table and return the top N rows by nomad score.
///
/// Filters run in order: budget, region, speed, visa. Rows whose nomad score
/// is undefined are never ranked. Ties are broken by city name.
///
/// # Errors
///
/// - [`Error::InvalidInput`] for a non-positive budget
/// - [`Error::NotReady`] if any record has not been scored yet
pub fn recommend(records: &[CombinedRecord], query: &RecommendationQuery) -> Result<Vec<Recommendation>, Error> {
    query.validate()?;

    if records.iter().any(|r| r.scores.is_none()) {
        return Err(Error::NotReady("scores have not been calculated for this dataset".into()));
    }

    let within_budget: Vec<&CombinedRecord> = records
        .iter()
        .filter(|r| r.monthly_cost.is_some_and(|c| c <= query.max_budget))
        .collect();
    tracing::debug!(rows = records.len(), kept = within_budget.len(), "budget filter");

    let in_region: Vec<&CombinedRecord> = match query.region_filter() {
        Some(target) => {
            let target = target.to_lowercase();
            within_budget
                .into_iter()
                .filter(|r| r.region.as_deref().is_some_and(|region| region.trim().to_lowercase() == target))
                .collect()
        }
        None => within_budget,
    };

    let fast_enough: Vec<&CombinedRecord> = if query.min_speed != 0.0 {
        in_region
            .into_iter()
            .filter(|r| r.avg_internet_mbps.is_some_and(|s| s >= query.min_speed))
            .collect()
    } else {
        in_region
    };

    let mut candidates: Vec<(&CombinedRecord, f64)> = fast_enough
        .into_iter()
        .filter(|r| !query.visa_free_only || r.visa_free)
        .filter_map(|r| r.nomad_score().filter(|s| s.is_finite()).map(|s| (r, s)))
        .collect();

    candidates.sort_by(|(a, sa), (b, sb)| {
        sb.partial_cmp(sa)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.city.cmp(&b.city))
    });
    candidates.truncate(query.top_n);

    tracing::debug!(returned = candidates.len(), region = ?query.region_filter(), "recommendations ranked");

    Ok(candidates.into_iter().map(|(r, _)| Recommendation::from(r)).collect())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

//! Flat on-disk row layout of a snapshot file.

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{CombinedRecord, ScoreCard};

/// Columns a snapshot file must carry to be adopted.
pub const REQUIRED_COLUMNS: [&str; 6] = ["city", "country", "visa_free", "monthly_cost", "avg_internet_mbps", "nomad_score"];

/// One CSV line. Optional columns may be missing from older files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub rent: Option<f64>,
    #[serde(default)]
    pub utilities: Option<f64>,
    #[serde(default)]
    pub internet_flat_fee: Option<f64>,
    #[serde(default)]
    pub transport: Option<f64>,
    #[serde(default)]
    pub food_estimate: Option<f64>,
    #[serde(default)]
    pub monthly_cost: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub mobile_mbps: Option<f64>,
    #[serde(default)]
    pub fixed_mbps: Option<f64>,
    #[serde(default)]
    pub avg_internet_mbps: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub visa_free: bool,
    #[serde(default)]
    pub visa_score: Option<f64>,
    #[serde(default)]
    pub cost_score: Option<f64>,
    #[serde(default)]
    pub speed_score: Option<f64>,
    #[serde(default)]
    pub nomad_score: Option<f64>,
}

impl From<&CombinedRecord> for SnapshotRow {
    fn from(r: &CombinedRecord) -> Self {
        Self {
            city: r.city.clone(),
            country: r.country.clone(),
            region: r.region.clone(),
            rent: r.rent,
            utilities: r.utilities,
            internet_flat_fee: r.internet_flat_fee,
            transport: r.transport,
            food_estimate: r.food_estimate,
            monthly_cost: r.monthly_cost,
            source: r.source.clone(),
            mobile_mbps: r.mobile_mbps,
            fixed_mbps: r.fixed_mbps,
            avg_internet_mbps: r.avg_internet_mbps,
            visa_free: r.visa_free,
            visa_score: r.scores.map(|s| s.visa_score),
            cost_score: r.scores.and_then(|s| s.cost_score),
            speed_score: r.scores.and_then(|s| s.speed_score),
            nomad_score: r.scores.and_then(|s| s.nomad_score),
        }
    }
}

impl From<SnapshotRow> for CombinedRecord {
    fn from(row: SnapshotRow) -> Self {
        let scores = row.visa_score.map(|visa_score| ScoreCard {
            visa_score,
            cost_score: row.cost_score,
            speed_score: row.speed_score,
            nomad_score: row.nomad_score,
        });
        Self {
            city: row.city.trim().to_string(),
            country: non_blank(row.country),
            region: non_blank(row.region),
            rent: row.rent,
            utilities: row.utilities,
            internet_flat_fee: row.internet_flat_fee,
            transport: row.transport,
            food_estimate: row.food_estimate,
            monthly_cost: row.monthly_cost,
            source: non_blank(row.source),
            mobile_mbps: row.mobile_mbps,
            fixed_mbps: row.fixed_mbps,
            avg_internet_mbps: row.avg_internet_mbps,
            visa_free: row.visa_free,
            scores,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Accepts `true`/`false` in any case, `1`/`0`, and blank as false.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid boolean: {other}"))),
    }
}

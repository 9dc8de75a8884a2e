//! Composite nomad score.
//!
//! - visa: 100 if visa-free, else 50
//! - cost: `(max - cost) / (max - min) * 100`, denominator 1.0 when all costs are equal
//! - speed: `avg / max * 100`, denominator 1.0 when the max is zero or undefined
//! - nomad: `visa * w_v + cost * w_c + speed * w_s`

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{CombinedRecord, ScoreCard};

/// Sub-score weights for the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Weights {
    pub visa: f64,
    pub cost: f64,
    pub speed: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self { visa: 0.25, cost: 0.40, speed: 0.35 }
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.visa + self.cost + self.speed
    }

    /// Weighted sum, undefined when any sub-score is.
    pub fn combine(&self, visa: f64, cost: Option<f64>, speed: Option<f64>) -> Option<f64> {
        Some(visa * self.visa + cost? * self.cost + speed? * self.speed)
    }
}

/// Compute (or recompute) the score card of every record.
///
/// Existing scores are overwritten, so running this twice with the same
/// weights leaves the table unchanged.
pub fn score(records: &mut [CombinedRecord], weights: &Weights) {
    let costs = finite(records.iter().map(|r| r.monthly_cost));
    let min_cost = costs.iter().copied().reduce(f64::min);
    let max_cost = costs.iter().copied().reduce(f64::max);
    let cost_denominator = match (min_cost, max_cost) {
        (Some(min), Some(max)) if max != min => max - min,
        _ => 1.0,
    };

    let max_speed = finite(records.iter().map(|r| r.avg_internet_mbps))
        .into_iter()
        .reduce(f64::max);
    let speed_denominator = match max_speed {
        Some(max) if max != 0.0 => max,
        _ => 1.0,
    };

    tracing::debug!(?min_cost, ?max_cost, ?max_speed, rows = records.len(), "scoring");

    for record in records.iter_mut() {
        let visa_score = if record.visa_free { 100.0 } else { 50.0 };
        let cost_score = match (record.monthly_cost, max_cost) {
            (Some(cost), Some(max)) if cost.is_finite() => Some((max - cost) / cost_denominator * 100.0),
            _ => None,
        };
        let speed_score = record
            .avg_internet_mbps
            .filter(|s| s.is_finite())
            .map(|s| s / speed_denominator * 100.0);

        record.scores = Some(ScoreCard {
            visa_score,
            cost_score,
            speed_score,
            nomad_score: weights.combine(visa_score, cost_score, speed_score),
        });
    }
}

fn finite(values: impl Iterator<Item = Option<f64>>) -> Vec<f64> {
    values.flatten().filter(|v| v.is_finite()).collect()
}

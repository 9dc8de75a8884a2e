//! Contracts for the three upstream data providers.
//!
//! Every adapter reports failures through [`SourceError`]. What a failure
//! means for the pipeline is decided by the orchestrator, per source:
//!
//! - visa: an error degrades to an empty category map
//! - speed: an error aborts the build with [`crate::Error::SpeedFetch`]
//! - cost: the adapter never fails as a whole; each row carries a
//!   [`CostRowStatus`] and the orchestrator escalates HTTP failures

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{CostRow, SpeedTables, VisaCategories};

/// Errors reported by a source adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The upstream signalled throttling (HTTP 429).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Non-success HTTP status.
    #[error("HTTP error: {status}")]
    HttpStatus { status: u16 },

    /// Connection, TLS or timeout failure.
    #[error("network error: {0}")]
    Network(String),

    /// The page did not have the expected structure.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Outcome of resolving one city against the cost source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostRowStatus {
    #[default]
    Fetched,
    RateLimited,
    HttpStatus {
        status: u16,
    },
    Unreachable {
        reason: String,
    },
}

impl From<&SourceError> for CostRowStatus {
    fn from(err: &SourceError) -> Self {
        match err {
            SourceError::RateLimited(_) => CostRowStatus::RateLimited,
            SourceError::HttpStatus { status: 429 } => CostRowStatus::RateLimited,
            SourceError::HttpStatus { status } => CostRowStatus::HttpStatus { status: *status },
            SourceError::Network(reason) | SourceError::Parse(reason) => {
                CostRowStatus::Unreachable { reason: reason.clone() }
            }
        }
    }
}

/// City-level cost of living provider.
#[async_trait]
pub trait CostSource: Send + Sync {
    /// Exactly one row per requested city, in request order.
    async fn fetch_costs(&self, cities: &[String]) -> Vec<CostRow>;
}

/// Country-level visa accessibility provider.
#[async_trait]
pub trait VisaSource: Send + Sync {
    async fn fetch_visa(&self) -> Result<VisaCategories, SourceError>;
}

/// Country-level internet speed provider.
#[async_trait]
pub trait SpeedSource: Send + Sync {
    async fn fetch_speeds(&self) -> Result<SpeedTables, SourceError>;
}

/// The three adapters an [`crate::Engine`] fetches from.
#[derive(Clone)]
pub struct Sources {
    pub cost: Arc<dyn CostSource>,
    pub visa: Arc<dyn VisaSource>,
    pub speed: Arc<dyn SpeedSource>,
}

impl Sources {
    pub fn new(cost: Arc<dyn CostSource>, visa: Arc<dyn VisaSource>, speed: Arc<dyn SpeedSource>) -> Self {
        Self { cost, visa, speed }
    }
}

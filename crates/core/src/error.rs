//! Unified error types for nomad-rank.
//!
//! Only conditions a caller can act on surface here. Cache I/O failures are
//! recovered inside [`crate::cache`] and never reach this type.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the recommendation engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., a non-positive budget).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The cost-of-living source answered with HTTP 429.
    #[error("RATE_LIMITED: {0}")]
    RateLimited(String),

    /// The cost-of-living source failed with any other HTTP status.
    #[error("COST_FETCH_FAILED: {0}")]
    CostFetch(String),

    /// The internet speed source failed.
    #[error("SPEED_FETCH_FAILED: {0}")]
    SpeedFetch(String),

    /// Cache-only mode is on and no usable snapshot exists on disk.
    #[error("NO_CACHED_DATA: {0}")]
    NoCachedData(String),

    /// Recommendations requested before any scored dataset exists.
    #[error("NOT_READY: {0}")]
    NotReady(String),
}

impl Error {
    /// Guidance to show an end user next to the error.
    ///
    /// None of these conditions are retried automatically.
    pub fn user_hint(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "Please enter a positive monthly budget in USD (e.g., 2000).",
            Error::RateLimited(_) => {
                "Cost of living data is temporarily unavailable (rate limited). Please wait 2-5 minutes and try again."
            }
            Error::CostFetch(_) => "We couldn't fetch cost of living data right now. Please try again shortly.",
            Error::SpeedFetch(_) => "We couldn't fetch internet speed data right now. Please try again shortly.",
            Error::NoCachedData(_) => {
                "Cache-only mode is on, but no local dataset exists yet. Turn cache-only mode off to download it once."
            }
            Error::NotReady(_) => "The dataset has not been built yet. Load it before asking for recommendations.",
        }
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::RateLimited(_) => -32010,
            Error::CostFetch(_) => -32008,
            Error::SpeedFetch(_) => -32009,
            Error::NoCachedData(_) => -32001,
            Error::NotReady(_) => -32002,
        };
        let data = serde_json::json!({ "hint": err.user_hint() });

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: Some(data) }
    }
}

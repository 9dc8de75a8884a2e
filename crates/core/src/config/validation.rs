//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - a weight is negative or not finite, or all weights are zero
    /// - `cities` is empty or contains only blank names
    /// - `dataset_key` is empty or not file-name safe
    /// - `home_country` or `user_agent` is empty
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_retries` is 0
    ///
    /// Returns `ConfigError::Missing` if `cost_url_template` lacks `{city}`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        for (field, value) in [("weights.visa", w.visa), ("weights.cost", w.cost), ("weights.speed", w.speed)] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be a finite, non-negative number"));
            }
        }
        if w.sum() == 0.0 {
            return Err(invalid("weights", "at least one weight must be positive"));
        }
        if (w.sum() - 1.0).abs() > 1e-6 {
            tracing::warn!(sum = w.sum(), "score weights do not sum to 1.0; nomad scores will not be on a 0-100 scale");
        }

        if self.cities.iter().all(|c| c.trim().is_empty()) {
            return Err(invalid("cities", "must name at least one city"));
        }

        if self.dataset_key.is_empty() {
            return Err(invalid("dataset_key", "must not be empty"));
        }
        if !self.dataset_key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(invalid("dataset_key", "may only contain ASCII letters, digits, '-' and '_'"));
        }

        if self.home_country.trim().is_empty() {
            return Err(invalid("home_country", "must not be empty"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.max_retries == 0 {
            return Err(invalid("max_retries", "must be at least 1"));
        }

        if !self.cost_url_template.contains("{city}") {
            return Err(ConfigError::Missing {
                field: "cost_url_template".into(),
                hint: "The URL needs a {city} placeholder".into(),
            });
        }

        Ok(())
    }
}

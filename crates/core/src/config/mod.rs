//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (NOMAD_*)
//! 2. TOML config file (if NOMAD_CONFIG_FILE set)
//! 3. Built-in defaults

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::geo::{DEFAULT_CITIES, GeoTables};
use crate::merge::HomeCountry;
use crate::scoring::Weights;

mod validation;

pub use validation::ConfigError;

pub const DEFAULT_COST_URL_TEMPLATE: &str = "https://www.numbeo.com/cost-of-living/in/{city}?displayCurrency=USD";
pub const DEFAULT_VISA_URL: &str =
    "https://visaindex.com/visa-requirement/united-states-of-america-passport-visa-free-countries-list/";
pub const DEFAULT_SPEED_URL: &str = "https://www.speedtest.net/global-index";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (NOMAD_*; nested keys split on `__`)
/// 2. TOML config file (if NOMAD_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the per-day snapshot files.
    ///
    /// Set via NOMAD_CACHE_DIR environment variable.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Key used in snapshot file names for the configured city list.
    #[serde(default = "default_dataset_key")]
    pub dataset_key: String,

    /// Country whose citizens the visa data describes.
    ///
    /// Set via NOMAD_HOME_COUNTRY environment variable.
    #[serde(default = "default_home_country")]
    pub home_country: String,

    #[serde(default = "default_home_country_aliases")]
    pub home_country_aliases: Vec<String>,

    /// Sub-score weights (NOMAD_WEIGHTS__VISA, NOMAD_WEIGHTS__COST, NOMAD_WEIGHTS__SPEED).
    #[serde(default)]
    pub weights: Weights,

    /// Cities fetched when a request does not name its own list.
    #[serde(default = "default_cities")]
    pub cities: Vec<String>,

    /// City → country entries layered over the built-in table.
    #[serde(default)]
    pub extra_city_countries: BTreeMap<String, String>,

    /// Country → region entries layered over the built-in table.
    #[serde(default)]
    pub extra_country_regions: BTreeMap<String, String>,

    /// Start in cache-only mode (never fetch).
    ///
    /// Set via NOMAD_CACHE_ONLY environment variable.
    #[serde(default)]
    pub cache_only: bool,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via NOMAD_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via NOMAD_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Pause after each successful cost page, in milliseconds.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Attempts per cost page before the city is given up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Cost page URL with a `{city}` placeholder.
    #[serde(default = "default_cost_url_template")]
    pub cost_url_template: String,

    #[serde(default = "default_visa_url")]
    pub visa_url: String,

    #[serde(default = "default_speed_url")]
    pub speed_url: String,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_dataset_key() -> String {
    "default".into()
}

fn default_home_country() -> String {
    HomeCountry::default().name
}

fn default_home_country_aliases() -> Vec<String> {
    HomeCountry::default().aliases
}

fn default_cities() -> Vec<String> {
    DEFAULT_CITIES.iter().map(|c| (*c).to_string()).collect()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0 Safari/537.36".into()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_request_delay_ms() -> u64 {
    800
}

fn default_max_retries() -> u32 {
    3
}

fn default_cost_url_template() -> String {
    DEFAULT_COST_URL_TEMPLATE.into()
}

fn default_visa_url() -> String {
    DEFAULT_VISA_URL.into()
}

fn default_speed_url() -> String {
    DEFAULT_SPEED_URL.into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            dataset_key: default_dataset_key(),
            home_country: default_home_country(),
            home_country_aliases: default_home_country_aliases(),
            weights: Weights::default(),
            cities: default_cities(),
            extra_city_countries: BTreeMap::new(),
            extra_country_regions: BTreeMap::new(),
            cache_only: false,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            request_delay_ms: default_request_delay_ms(),
            max_retries: default_max_retries(),
            cost_url_template: default_cost_url_template(),
            visa_url: default_visa_url(),
            speed_url: default_speed_url(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Built-in lookup tables with the configured extras layered on top.
    pub fn geo_tables(&self) -> GeoTables {
        GeoTables::with_overrides(&self.extra_city_countries, &self.extra_country_regions)
    }

    pub fn home(&self) -> HomeCountry {
        HomeCountry::new(self.home_country.trim(), self.home_country_aliases.clone())
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `NOMAD_`
    /// 2. TOML file from `NOMAD_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("NOMAD_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("NOMAD_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

//! HTTP source adapters for nomad-rank.
//!
//! This crate implements the three [`nomad_core::sources`] contracts against
//! third-party HTML pages: per-city cost of living, passport visa lists and
//! the country-level internet speed index. Page parsing is best-effort;
//! structural mismatches surface as [`SourceError::Parse`].

pub mod cost;
pub mod http;
pub mod speed;
pub mod url;
pub mod visa;

use std::sync::Arc;

use nomad_core::{AppConfig, SourceError, Sources};
use scraper::{ElementRef, Selector};

pub use cost::{CostPageParser, CostPageSource};
pub use http::{HttpClient, HttpConfig, RateLimiter};
pub use speed::{SpeedPageParser, SpeedPageSource};
pub use visa::{VisaPageParser, VisaPageSource};

/// Build the three HTTP-backed sources from configuration, sharing one client.
pub fn sources(config: &AppConfig) -> Result<Sources, SourceError> {
    let http = HttpClient::new(&HttpConfig::from(config))?;
    let cost = CostPageSource::new(http.clone(), config)?;
    let visa = VisaPageSource::new(http.clone(), config.visa_url.clone())?;
    let speed = SpeedPageSource::new(http, config.speed_url.clone())?;
    Ok(Sources::new(Arc::new(cost), Arc::new(visa), Arc::new(speed)))
}

pub(crate) fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::Parse(format!("invalid selector {css:?}: {e:?}")))
}

/// Text content of an element with whitespace runs collapsed.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

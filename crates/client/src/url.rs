//! Source URL building and validation.

/// Error type for source URL problems.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse a configured source URL.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Reject anything but http/https
/// 4. Remove fragment (#...)
pub fn parse_source_url(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// The path segment a city is addressed by: trimmed, spaces as hyphens.
pub fn city_slug(city: &str) -> String {
    city.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Substitute `{city}` in `template` and parse the result.
pub fn city_page_url(template: &str, city: &str) -> Result<url::Url, UrlError> {
    parse_source_url(&template.replace("{city}", &city_slug(city)))
}

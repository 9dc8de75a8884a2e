//! Shared HTTP plumbing for the source adapters.
//!
//! - One `reqwest` client (rustls, compressed bodies) per process
//! - Browser-like `Accept` headers; the user agent comes from config
//! - HTTP 429 maps to [`SourceError::RateLimited`], any other non-2xx status
//!   to [`SourceError::HttpStatus`]
//! - A minimum-interval limiter for sources that want to be polite

use std::time::{Duration, Instant};

use nomad_core::{AppConfig, SourceError};
use reqwest::{Client, StatusCode, header};
use tokio::sync::Mutex;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Configuration for the shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let app = AppConfig::default();
        Self { user_agent: app.user_agent.clone(), timeout: app.timeout() }
    }
}

impl From<&AppConfig> for HttpConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout() }
    }
}

/// Thin wrapper that fetches HTML pages as text.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, SourceError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| SourceError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }

    /// GET `url` and return the body as text.
    pub async fn get_text(&self, url: &Url) -> Result<String, SourceError> {
        let start = Instant::now();
        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, ACCEPT_HTML)
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited(format!("HTTP 429 from {url}")));
        }
        if !status.is_success() {
            return Err(SourceError::HttpStatus { status: status.as_u16() });
        }

        let body = response.text().await.map_err(network_error)?;
        tracing::debug!(%url, status = status.as_u16(), bytes = body.len(), ms = start.elapsed().as_millis() as u64, "fetched page");
        Ok(body)
    }
}

fn network_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Network(format!("request timed out: {err}"))
    } else {
        SourceError::Network(err.to_string())
    }
}

/// Enforces a minimum interval between requests.
#[derive(Debug)]
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self { last_request: Mutex::new(None), min_interval }
    }

    /// Wait until `min_interval` has passed since the previous call.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

//! Cost-of-living adapter: one city page per requested city.
//!
//! ### Fetch policy
//! - Cities are fetched one after another, in request order.
//! - Up to `max_retries` attempts per city with exponential backoff
//!   (0.5s, 1s, 2s, ...) after each failed attempt.
//! - A polite pause after every successful page.
//! - Never fails as a whole: a city that cannot be resolved becomes a row with
//!   no metrics and a [`CostRowStatus`] describing the last failure.
//!
//! ### Page parsing
//! Values are read from the first table row whose label cell contains every
//! keyword of an item, taking the first number in the value cell.

use std::time::Duration;

use async_trait::async_trait;
use nomad_core::{AppConfig, CostRow, CostRowStatus, CostSource, SourceError};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::http::{HttpClient, RateLimiter};
use crate::url::city_page_url;

const BACKOFF_BASE: Duration = Duration::from_millis(500);

const RENT: &[&str] = &["apartment", "1 bedroom", "city"];
const UTILITIES: &[&str] = &["utilities", "85"];
const INTERNET: &[&str] = &["internet", "60"];
const TRANSPORT: &[&str] = &["monthly", "pass"];

/// Grocery items and the monthly quantity assumed for each.
const FOOD_BASKET: [(&[&str], f64); 6] = [
    (&["milk", "1 liter"], 8.0),
    (&["bread", "500"], 8.0),
    (&["rice", "1kg"], 3.0),
    (&["eggs", "12"], 2.0),
    (&["chicken", "1kg"], 3.0),
    (&["apples", "1kg"], 4.0),
];

/// Fewer parsed basket items than this and no food estimate is given.
const MIN_BASKET_ITEMS: usize = 3;

/// Extracts cost metrics from a city page.
#[derive(Debug, Clone)]
pub struct CostPageParser {
    rows: Selector,
    cells: Selector,
    number: Regex,
}

impl CostPageParser {
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self {
            rows: crate::selector("table tr")?,
            cells: crate::selector("td")?,
            number: Regex::new(r"[-+]?\d*\.?\d+").map_err(|e| SourceError::Parse(e.to_string()))?,
        })
    }

    /// First number in `text`, with thousands separators removed.
    pub fn parse_price(&self, text: &str) -> Option<f64> {
        let cleaned = text.replace(',', "");
        self.number.find(&cleaned)?.as_str().parse().ok()
    }

    /// Value of the first row whose label contains every needle (case-insensitive).
    fn find_row_value(&self, document: &Html, needles: &[&str]) -> Option<f64> {
        document.select(&self.rows).find_map(|row| {
            let cells: Vec<ElementRef> = row.select(&self.cells).collect();
            if cells.len() < 2 {
                return None;
            }
            let label = crate::element_text(&cells[0]).to_lowercase();
            if needles.iter().all(|n| label.contains(&n.to_lowercase())) {
                self.parse_price(&crate::element_text(&cells[1]))
            } else {
                None
            }
        })
    }

    /// Scaled monthly grocery estimate, rounded to cents.
    fn food_estimate(&self, document: &Html) -> Option<f64> {
        let priced: Vec<f64> = FOOD_BASKET
            .iter()
            .filter_map(|(needles, quantity)| self.find_row_value(document, needles).map(|p| p * quantity))
            .collect();
        if priced.len() < MIN_BASKET_ITEMS {
            return None;
        }
        let subtotal: f64 = priced.iter().sum();
        let scaled = subtotal * (FOOD_BASKET.len() as f64 / priced.len() as f64);
        Some((scaled * 100.0).round() / 100.0)
    }

    /// Build the cost row for `city` from its page.
    pub fn parse(&self, html: &str, city: &str, source: &str) -> CostRow {
        let document = Html::parse_document(html);
        CostRow {
            city: city.to_string(),
            rent: self.find_row_value(&document, RENT),
            utilities: self.find_row_value(&document, UTILITIES),
            internet_flat_fee: self.find_row_value(&document, INTERNET),
            transport: self.find_row_value(&document, TRANSPORT),
            food_estimate: self.food_estimate(&document),
            monthly_cost: None,
            source: source.to_string(),
            status: CostRowStatus::Fetched,
        }
    }
}

/// [`CostSource`] backed by per-city HTML pages.
pub struct CostPageSource {
    http: HttpClient,
    parser: CostPageParser,
    url_template: String,
    max_retries: u32,
    backoff_base: Duration,
    limiter: RateLimiter,
}

impl CostPageSource {
    pub fn new(http: HttpClient, config: &AppConfig) -> Result<Self, SourceError> {
        Ok(Self {
            http,
            parser: CostPageParser::new()?,
            url_template: config.cost_url_template.clone(),
            max_retries: config.max_retries.max(1),
            backoff_base: BACKOFF_BASE,
            limiter: RateLimiter::new(config.request_delay()),
        })
    }

    /// Override the first backoff interval (tests use zero).
    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    async fn fetch_city(&self, city: &str) -> CostRow {
        let url = match city_page_url(&self.url_template, city) {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(city, error = %err, "cannot build cost page URL");
                return CostRow::failed(city, &self.url_template, CostRowStatus::Unreachable { reason: err.to_string() });
            }
        };

        let mut last_err = SourceError::Network("no attempt made".into());
        for attempt in 0..self.max_retries {
            self.limiter.acquire().await;
            match self.http.get_text(&url).await {
                Ok(html) => {
                    let row = self.parser.parse(&html, city, url.as_str());
                    tracing::debug!(city, rent = ?row.rent, food = ?row.food_estimate, "cost page parsed");
                    return row;
                }
                Err(err) => {
                    tracing::debug!(city, attempt, error = %err, "cost page attempt failed");
                    last_err = err;
                }
            }
            tokio::time::sleep(self.backoff_base * 2u32.saturating_pow(attempt)).await;
        }

        tracing::warn!(city, error = %last_err, attempts = self.max_retries, "giving up on cost page");
        CostRow::failed(city, url.as_str(), CostRowStatus::from(&last_err))
    }
}

#[async_trait]
impl CostSource for CostPageSource {
    async fn fetch_costs(&self, cities: &[String]) -> Vec<CostRow> {
        let mut rows = Vec::with_capacity(cities.len());
        for city in cities {
            rows.push(self.fetch_city(city).await);
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpConfig;

    const PAGE: &str = r#"
        <html><body>
          <table class="data_wide_table">
            <tr><th>Restaurants</th><th>Price</th></tr>
            <tr><td>Milk (regular), (1 liter)</td><td>1.10 $</td></tr>
            <tr><td>Loaf of Fresh White Bread (500g)</td><td>2.00 $</td></tr>
            <tr><td>Rice (white), (1kg)</td><td>1.50 $</td></tr>
            <tr><td>Eggs (regular) (12)</td><td>3.00 $</td></tr>
            <tr><td>Monthly Pass (Regular Price)</td><td>45.00 $</td></tr>
            <tr><td>Basic (Electricity, Heating, Cooling, Water, Garbage) for 85m2 Apartment</td><td>120.50 $</td></tr>
            <tr><td>Internet (60 Mbps or More, Unlimited Data, Cable/ADSL)</td><td>35.00 $</td></tr>
            <tr><td>Apartment (1 bedroom) in City Centre</td><td>1,250.00 $</td></tr>
            <tr><td>Apartment (1 bedroom) Outside of Centre</td><td>900.00 $</td></tr>
          </table>
        </body></html>
    "#;

    fn parser() -> CostPageParser {
        CostPageParser::new().unwrap()
    }

    #[test]
    fn test_parse_price() {
        let p = parser();
        assert_eq!(p.parse_price("$1,234.56"), Some(1234.56));
        assert_eq!(p.parse_price("45.00 $"), Some(45.0));
        assert_eq!(p.parse_price(".5"), Some(0.5));
        assert_eq!(p.parse_price("-3"), Some(-3.0));
        assert_eq!(p.parse_price("?"), None);
        assert_eq!(p.parse_price(""), None);
    }

    #[test]
    fn test_parse_page() {
        let row = parser().parse(PAGE, "Lisbon", "https://example.com/Lisbon");
        assert_eq!(row.city, "Lisbon");
        assert_eq!(row.rent, Some(1250.0));
        assert_eq!(row.transport, Some(45.0));
        assert_eq!(row.internet_flat_fee, Some(35.0));
        assert_eq!(row.status, CostRowStatus::Fetched);
    }

    #[test]
    fn test_utilities_label_without_keyword() {
        // "utilities" is absent from the label above, so the lookup misses.
        let row = parser().parse(PAGE, "Lisbon", "");
        assert_eq!(row.utilities, None);

        let page = "<table><tr><td>Utilities (Monthly) for 85m2 Apartment</td><td>150</td></tr></table>";
        assert_eq!(parser().parse(page, "Lisbon", "").utilities, Some(150.0));
    }

    #[test]
    fn test_food_basket_scaled_to_six_items() {
        let row = parser().parse(PAGE, "Lisbon", "");
        // milk 8.8 + bread 16 + rice 4.5 + eggs 6 = 35.3, scaled by 6/4
        assert_eq!(row.food_estimate, Some(52.95));
    }

    #[test]
    fn test_food_basket_needs_three_items() {
        let page = r#"<table>
            <tr><td>Milk (regular), (1 liter)</td><td>1.00</td></tr>
            <tr><td>Eggs (regular) (12)</td><td>3.00</td></tr>
        </table>"#;
        assert_eq!(parser().parse(page, "X", "").food_estimate, None);
    }

    #[test]
    fn test_empty_page_has_no_metrics() {
        let row = parser().parse("<html></html>", "Nowhere", "");
        assert!(row.components().iter().all(Option::is_none));
    }

    #[tokio::test]
    async fn test_unreachable_cities_become_failed_rows() {
        let config = AppConfig {
            cost_url_template: "http://127.0.0.1:9/{city}".into(),
            max_retries: 2,
            request_delay_ms: 0,
            ..Default::default()
        };
        let http = HttpClient::new(&HttpConfig { timeout: Duration::from_secs(2), ..Default::default() }).unwrap();
        let source = CostPageSource::new(http, &config).unwrap().with_backoff_base(Duration::ZERO);

        let cities = vec!["New York".to_string(), "Paris".to_string()];
        let rows = source.fetch_costs(&cities).await;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].city, "New York");
        assert_eq!(rows[1].city, "Paris");
        assert!(rows.iter().all(|r| matches!(r.status, CostRowStatus::Unreachable { .. })));
        assert!(rows[0].source.ends_with("/New-York"));
    }
}

//! Visa adapter: category headings and their country lists from one page.
//!
//! Each section heading (`h2.pb-4`) is followed by a `div.countriesList`
//! sibling, either directly or as a sibling of the heading's parent, holding
//! `span.country-name` entries.

use async_trait::async_trait;
use nomad_core::{SourceError, VisaCategories, VisaSource};
use scraper::{ElementRef, Html, Selector};

use crate::http::HttpClient;
use crate::url::parse_source_url;

const COUNTRIES_LIST_CLASS: &str = "countriesList";

/// Extracts the category → countries map from a visa page.
#[derive(Debug, Clone)]
pub struct VisaPageParser {
    headings: Selector,
    countries: Selector,
}

impl VisaPageParser {
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self { headings: crate::selector("h2.pb-4")?, countries: crate::selector("span.country-name")? })
    }

    /// # Errors
    ///
    /// Returns [`SourceError::Parse`] when the page has no section headings.
    pub fn parse(&self, html: &str) -> Result<VisaCategories, SourceError> {
        let document = Html::parse_document(html);
        let mut categories = VisaCategories::new();
        let mut headings = 0usize;

        for heading in document.select(&self.headings) {
            headings += 1;
            let title = crate::element_text(&heading);
            let Some(list) = countries_list_after(heading) else {
                tracing::debug!(%title, "visa heading without a country list");
                continue;
            };
            let countries: Vec<String> = list
                .select(&self.countries)
                .map(|span| crate::element_text(&span))
                .filter(|c| !c.is_empty())
                .collect();
            categories.insert(title, countries);
        }

        if headings == 0 {
            return Err(SourceError::Parse("no visa section headings found".into()));
        }
        Ok(categories)
    }
}

fn is_countries_list(element: &ElementRef) -> bool {
    element.value().name() == "div" && element.value().classes().any(|c| c == COUNTRIES_LIST_CLASS)
}

fn next_countries_list(element: ElementRef) -> Option<ElementRef> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(is_countries_list)
}

fn countries_list_after(heading: ElementRef) -> Option<ElementRef> {
    next_countries_list(heading).or_else(|| heading.parent().and_then(ElementRef::wrap).and_then(next_countries_list))
}

/// [`VisaSource`] backed by a single HTML page.
pub struct VisaPageSource {
    http: HttpClient,
    parser: VisaPageParser,
    url: String,
}

impl VisaPageSource {
    pub fn new(http: HttpClient, url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self { http, parser: VisaPageParser::new()?, url: url.into() })
    }
}

#[async_trait]
impl VisaSource for VisaPageSource {
    async fn fetch_visa(&self) -> Result<VisaCategories, SourceError> {
        let url = parse_source_url(&self.url).map_err(|e| SourceError::Parse(e.to_string()))?;
        let html = self.http.get_text(&url).await?;
        let categories = self.parser.parse(&html)?;
        tracing::debug!(categories = categories.len(), "visa page parsed");
        Ok(categories)
    }
}

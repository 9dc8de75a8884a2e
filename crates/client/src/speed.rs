//! Speed adapter: per-country mobile and fixed tables from the global index page.
//!
//! The page lists several tables; the country-level mobile and fixed
//! broadband tables sit at fixed positions. Within a table the country and
//! speed columns are located by header text ("Country", "Mbps").

use async_trait::async_trait;
use nomad_core::{SourceError, SpeedRow, SpeedSource, SpeedTables};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::http::HttpClient;
use crate::url::parse_source_url;

pub const MOBILE_TABLE_INDEX: usize = 2;
pub const FIXED_TABLE_INDEX: usize = 4;

/// Extracts the two country tables from the index page.
#[derive(Debug, Clone)]
pub struct SpeedPageParser {
    tables: Selector,
    rows: Selector,
    headers: Selector,
    cells: Selector,
    number: Regex,
}

impl SpeedPageParser {
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self {
            tables: crate::selector("table")?,
            rows: crate::selector("tr")?,
            headers: crate::selector("th")?,
            cells: crate::selector("td")?,
            number: Regex::new(r"\d+(?:\.\d+)?").map_err(|e| SourceError::Parse(e.to_string()))?,
        })
    }

    /// # Errors
    ///
    /// Returns [`SourceError::Parse`] when either table is missing or has no
    /// "Mbps" column.
    pub fn parse(&self, html: &str) -> Result<SpeedTables, SourceError> {
        let document = Html::parse_document(html);
        let tables: Vec<ElementRef> = document.select(&self.tables).collect();

        let table = |index: usize, kind: &str| {
            tables
                .get(index)
                .ok_or_else(|| SourceError::Parse(format!("{kind} table (#{index}) not found; page has {}", tables.len())))
                .and_then(|t| self.parse_table(*t, kind))
        };

        Ok(SpeedTables { mobile: table(MOBILE_TABLE_INDEX, "mobile")?, fixed: table(FIXED_TABLE_INDEX, "fixed")? })
    }

    fn parse_table(&self, table: ElementRef, kind: &str) -> Result<Vec<SpeedRow>, SourceError> {
        let header: Vec<String> = table
            .select(&self.rows)
            .map(|row| row.select(&self.headers).map(|th| crate::element_text(&th)).collect::<Vec<_>>())
            .find(|cells| !cells.is_empty())
            .unwrap_or_default();

        let column = |name: &str| header.iter().position(|h| h.eq_ignore_ascii_case(name));
        let mbps_col = column("Mbps")
            .ok_or_else(|| SourceError::Parse(format!("{kind} table has no Mbps column (headers: {header:?})")))?;
        let country_col = column("Country").unwrap_or(0);

        let rows: Vec<SpeedRow> = table
            .select(&self.rows)
            .filter_map(|row| {
                let cells: Vec<String> = row.select(&self.cells).map(|td| crate::element_text(&td)).collect();
                let country = cells.get(country_col)?.clone();
                if country.is_empty() {
                    return None;
                }
                let mbps = cells.get(mbps_col).and_then(|v| self.parse_mbps(v));
                Some(SpeedRow { country, mbps })
            })
            .collect();

        tracing::debug!(kind, rows = rows.len(), "speed table parsed");
        Ok(rows)
    }

    fn parse_mbps(&self, text: &str) -> Option<f64> {
        self.number.find(&text.replace(',', ""))?.as_str().parse().ok()
    }
}

/// [`SpeedSource`] backed by the global index page.
pub struct SpeedPageSource {
    http: HttpClient,
    parser: SpeedPageParser,
    url: String,
}

impl SpeedPageSource {
    pub fn new(http: HttpClient, url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self { http, parser: SpeedPageParser::new()?, url: url.into() })
    }
}

#[async_trait]
impl SpeedSource for SpeedPageSource {
    async fn fetch_speeds(&self) -> Result<SpeedTables, SourceError> {
        let url = parse_source_url(&self.url).map_err(|e| SourceError::Parse(e.to_string()))?;
        let html = self.http.get_text(&url).await?;
        self.parser.parse(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country_table(rows: &[(&str, &str)]) -> String {
        let body: String = rows
            .iter()
            .map(|(country, mbps)| format!("<tr><td>1</td><td>+2</td><td> {country} </td><td>{mbps}</td></tr>"))
            .collect();
        format!("<table><tr><th>#</th><th>#</th><th>Country</th><th>Mbps</th></tr>{body}</table>")
    }

    fn page(mobile: &str, fixed: &str) -> String {
        let filler = "<table><tr><th>City</th><th>Mbps</th></tr><tr><td>Oslo</td><td>1</td></tr></table>";
        format!("<html><body>{filler}{filler}{mobile}{filler}{fixed}</body></html>")
    }

    #[test]
    fn test_parse_both_tables() {
        let html = page(
            &country_table(&[("United Arab Emirates", "398.51"), ("Qatar", "344.00")]),
            &country_table(&[("Singapore", "1,012.4"), ("Chile", "n/a")]),
        );
        let tables = SpeedPageParser::new().unwrap().parse(&html).unwrap();

        assert_eq!(tables.mobile.len(), 2);
        assert_eq!(tables.mobile[0], SpeedRow { country: "United Arab Emirates".into(), mbps: Some(398.51) });
        assert_eq!(tables.fixed[0].mbps, Some(1012.4));
        assert_eq!(tables.fixed[1], SpeedRow { country: "Chile".into(), mbps: None });
    }

    #[test]
    fn test_missing_table_is_parse_error() {
        let html = "<table><tr><th>Country</th><th>Mbps</th></tr></table>";
        let result = SpeedPageParser::new().unwrap().parse(html);
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_missing_mbps_column_is_parse_error() {
        let bad = "<table><tr><th>Country</th><th>Speed</th></tr><tr><td>Peru</td><td>5</td></tr></table>";
        let html = page(bad, &country_table(&[("Peru", "5")]));
        let result = SpeedPageParser::new().unwrap().parse(&html);
        assert!(matches!(result, Err(SourceError::Parse(msg)) if msg.contains("mobile")));
    }
}

//! In-process sources and engine fixtures for tool tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use nomad_core::{
    AppConfig, CostRow, CostRowStatus, CostSource, Engine, FixedClock, SourceError, Sources, SpeedRow, SpeedSource,
    SpeedTables, VisaCategories, VisaSource,
};
use rmcp::model::{CallToolResult, RawContent};
use tempfile::TempDir;
use tokio::sync::Mutex;

/// Counts every call across the three fake sources.
#[derive(Default)]
pub struct FakeSources {
    pub calls: AtomicUsize,
}

#[async_trait]
impl CostSource for FakeSources {
    async fn fetch_costs(&self, cities: &[String]) -> Vec<CostRow> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        cities
            .iter()
            .enumerate()
            .map(|(i, city)| CostRow {
                city: city.clone(),
                rent: Some(700.0 + 500.0 * i as f64),
                utilities: Some(120.0),
                internet_flat_fee: Some(30.0),
                transport: Some(50.0),
                food_estimate: Some(300.0),
                monthly_cost: None,
                source: format!("https://costs.example/{city}"),
                status: CostRowStatus::Fetched,
            })
            .collect()
    }
}

#[async_trait]
impl VisaSource for FakeSources {
    async fn fetch_visa(&self) -> Result<VisaCategories, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(VisaCategories::from([
            ("Visa-free countries".to_string(), vec!["Portugal".to_string(), "Japan".to_string()]),
            ("E-visa".to_string(), vec!["Thailand".to_string()]),
        ]))
    }
}

#[async_trait]
impl SpeedSource for FakeSources {
    async fn fetch_speeds(&self) -> Result<SpeedTables, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let row = |country: &str, mbps: f64| SpeedRow { country: country.into(), mbps: Some(mbps) };
        Ok(SpeedTables {
            mobile: vec![row("Portugal", 90.0), row("Japan", 110.0), row("Thailand", 50.0)],
            fixed: vec![row("Portugal", 160.0), row("Japan", 210.0), row("Thailand", 190.0)],
        })
    }
}

pub struct Fixture {
    pub dir: TempDir,
    pub fakes: Arc<FakeSources>,
    pub engine: Mutex<Engine>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let fakes = Arc::new(FakeSources::default());
        let config = AppConfig {
            cache_dir: dir.path().to_path_buf(),
            cities: vec!["Lisbon".into(), "Tokyo".into(), "Bangkok".into()],
            ..Default::default()
        };
        let sources = Sources::new(fakes.clone(), fakes.clone(), fakes.clone());
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
        let engine = Engine::new(config, sources).with_clock(clock);
        Self { dir, fakes, engine: Mutex::new(engine) }
    }

    pub fn calls(&self) -> usize {
        self.fakes.calls.load(Ordering::SeqCst)
    }
}

/// Parse the JSON text of a successful tool result.
pub fn result_json(result: &CallToolResult) -> serde_json::Value {
    let content = result.content.first().expect("tool result has content");
    match &content.raw {
        RawContent::Text(text) => serde_json::from_str(&text.text).expect("tool result is JSON"),
        other => panic!("expected text content, got {other:?}"),
    }
}

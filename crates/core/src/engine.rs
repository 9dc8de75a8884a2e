//! The caller-owned engine handle: daily cache-or-fetch orchestration.
//!
//! An [`Engine`] holds at most one built [`Instance`], valid for a single
//! (day tag, dataset key) pair. Queries reuse it while it is valid; otherwise
//! [`Engine::ensure_daily_dataset`] adopts today's snapshot from disk or
//! fetches the three sources, builds, scores and writes a new one.
//!
//! In cache-only mode the engine never fetches: it reuses whatever instance it
//! holds, or adopts the newest snapshot on disk, and never deletes old files.

use std::sync::Arc;

use crate::Error;
use crate::cache::{self, CacheStore, Clock, DayTag, Snapshot, SystemClock};
use crate::config::AppConfig;
use crate::dataset::Dataset;
use crate::explorer::{self, CostOfLivingRow, CountrySpeedRow};
use crate::geo::GeoTables;
use crate::merge::{self, HomeCountry};
use crate::model::{CombinedRecord, VisaCategories};
use crate::recommend::{self, Recommendation, RecommendationQuery};
use crate::scoring::{self, Weights};
use crate::sources::{CostRowStatus, Sources};

/// A built, scored table and the (tag, key) it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub tag: DayTag,
    pub dataset_key: String,
    pub records: Vec<CombinedRecord>,
    /// Only set when this instance fetched the visa source itself.
    pub visa_categories: Option<VisaCategories>,
}

impl Instance {
    pub fn is_valid_for(&self, tag: &DayTag, dataset_key: &str) -> bool {
        &self.tag == tag && self.dataset_key == dataset_key
    }
}

/// Recommendation engine with its cache, sources and current instance.
///
/// Not internally synchronized; callers sharing one engine must serialize
/// access (the MCP server holds it behind an async mutex).
pub struct Engine {
    config: AppConfig,
    geo: GeoTables,
    home: HomeCountry,
    weights: Weights,
    store: CacheStore,
    sources: Sources,
    clock: Arc<dyn Clock>,
    cache_only: bool,
    instance: Option<Instance>,
}

impl Engine {
    pub fn new(config: AppConfig, sources: Sources) -> Self {
        Self {
            geo: config.geo_tables(),
            home: config.home(),
            weights: config.weights,
            store: CacheStore::new(config.cache_dir.clone()),
            cache_only: config.cache_only,
            config,
            sources,
            clock: Arc::new(SystemClock),
            instance: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn cache_only(&self) -> bool {
        self.cache_only
    }

    /// Toggle cache-only mode for this engine.
    ///
    /// The current instance is kept either way.
    pub fn set_cache_only(&mut self, cache_only: bool) {
        tracing::info!(cache_only, "cache-only mode changed");
        self.cache_only = cache_only;
    }

    pub fn today(&self) -> DayTag {
        self.clock.today_tag()
    }

    /// The instance currently held, if any, without building one.
    pub fn current(&self) -> Option<&Instance> {
        self.instance.as_ref()
    }

    /// The requested list with blanks dropped, or the configured list.
    fn resolve_cities(&self, cities: Option<&[String]>) -> Vec<String> {
        let requested: Vec<String> = cities
            .unwrap_or_default()
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if requested.is_empty() { self.config.cities.clone() } else { requested }
    }

    fn key_for(&self, cities: &[String]) -> String {
        cache::dataset_key(cities, &self.config.cities, &self.config.dataset_key)
    }

    /// Adopt today's snapshot, fall back to the newest one (cache-only mode),
    /// or fetch and build a fresh table.
    ///
    /// # Errors
    ///
    /// - [`Error::NoCachedData`] in cache-only mode when no valid snapshot exists
    /// - [`Error::RateLimited`] / [`Error::CostFetch`] when the cost source failed
    /// - [`Error::SpeedFetch`] when the speed source failed
    pub async fn ensure_daily_dataset(&self, cities: &[String]) -> Result<Instance, Error> {
        let today = self.today();
        let key = self.key_for(cities);
        tracing::debug!(tag = %today, key = %key, cities = cities.len(), cache_only = self.cache_only, "ensuring daily dataset");

        if let Some(snapshot) = self.store.read_today(&key, &today) {
            tracing::info!(tag = %today, key = %key, rows = snapshot.records.len(), "using today's snapshot");
            return Ok(self.adopt(snapshot.records, today, key));
        }

        if self.cache_only {
            let Some(snapshot) = self.store.read_latest_any(&key) else {
                return Err(Error::NoCachedData(format!(
                    "cache-only mode is on and no snapshot was found in {}",
                    self.store.dir().display()
                )));
            };
            tracing::info!(tag = %snapshot.tag, rows = snapshot.records.len(), "using latest available snapshot");
            return Ok(self.adopt(snapshot.records, snapshot.tag, key));
        }

        tracing::info!(tag = %today, key = %key, "no valid snapshot; fetching sources");
        let instance = self.fetch_and_build(cities, today, key).await?;

        if !instance.records.is_empty() {
            let snapshot = Snapshot {
                tag: instance.tag.clone(),
                dataset_key: Some(instance.dataset_key.clone()),
                records: instance.records.clone(),
            };
            self.store.write(&snapshot, self.cache_only);
        }
        Ok(instance)
    }

    /// Return the held instance when it is still usable, otherwise build one.
    ///
    /// `None` (or an empty list) means the configured cities. In cache-only
    /// mode any held instance is reused regardless of its tag or key.
    pub async fn get_or_build(&mut self, cities: Option<&[String]>) -> Result<&Instance, Error> {
        let cities = self.resolve_cities(cities);
        let key = self.key_for(&cities);
        let today = self.today();

        let reuse = match &self.instance {
            Some(_) if self.cache_only => true,
            Some(instance) => instance.is_valid_for(&today, &key),
            None => false,
        };

        if reuse {
            tracing::debug!(tag = %today, key = %key, "reusing in-memory instance");
        } else {
            let instance = self.ensure_daily_dataset(&cities).await?;
            self.instance = Some(instance);
            if !self.cache_only {
                self.store.cleanup(&today);
            }
        }

        self.instance
            .as_ref()
            .ok_or_else(|| Error::NotReady("no dataset instance available".into()))
    }

    /// Ranked recommendations for `query` over `cities` (or the configured list).
    ///
    /// The query is validated before anything is built or fetched.
    pub async fn recommend(
        &mut self, query: &RecommendationQuery, cities: Option<&[String]>,
    ) -> Result<Vec<Recommendation>, Error> {
        query.validate()?;
        let instance = self.get_or_build(cities).await?;
        recommend::recommend(&instance.records, query)
    }

    /// The combined table for the configured cities.
    ///
    /// Fetches only when neither the held instance nor a snapshot can be used.
    pub async fn combined_dataset(&mut self) -> Result<Vec<CombinedRecord>, Error> {
        Ok(self.get_or_build(None).await?.records.clone())
    }

    pub async fn cost_of_living(&mut self, query: Option<&str>) -> Result<Vec<CostOfLivingRow>, Error> {
        let instance = self.get_or_build(None).await?;
        Ok(explorer::cost_of_living(&instance.records, query))
    }

    pub async fn internet_speeds(&mut self, query: Option<&str>) -> Result<Vec<CountrySpeedRow>, Error> {
        let instance = self.get_or_build(None).await?;
        Ok(explorer::internet_speeds(&instance.records, query))
    }

    /// The raw visa category map, empty when the instance came from a snapshot.
    pub async fn visa_categories(&mut self) -> Result<VisaCategories, Error> {
        let instance = self.get_or_build(None).await?;
        Ok(instance.visa_categories.clone().unwrap_or_default())
    }

    /// Re-enrich and re-score a snapshot loaded from disk.
    fn adopt(&self, mut records: Vec<CombinedRecord>, tag: DayTag, dataset_key: String) -> Instance {
        merge::enrich(&mut records, &self.geo, &self.home);
        scoring::score(&mut records, &self.weights);
        Instance { tag, dataset_key, records, visa_categories: None }
    }

    async fn fetch_and_build(&self, cities: &[String], tag: DayTag, dataset_key: String) -> Result<Instance, Error> {
        let visa = match self.sources.visa.fetch_visa().await {
            Ok(visa) => visa,
            Err(err) => {
                tracing::warn!(error = %err, "visa source failed; continuing without visa-free data");
                VisaCategories::new()
            }
        };
        tracing::debug!(categories = visa.len(), "visa source done");

        let costs = self.sources.cost.fetch_costs(cities).await;
        check_cost_rows(&costs)?;
        tracing::debug!(rows = costs.len(), "cost source done");

        let speeds = self
            .sources
            .speed
            .fetch_speeds()
            .await
            .map_err(|err| Error::SpeedFetch(err.to_string()))?;
        tracing::debug!(mobile = speeds.mobile.len(), fixed = speeds.fixed.len(), "speed source done");

        let dataset = Dataset::build(visa, costs, speeds);
        let mut records = merge::merge(&dataset, &self.geo, &self.home);
        scoring::score(&mut records, &self.weights);

        tracing::info!(tag = %tag, key = %dataset_key, rows = records.len(), "built fresh dataset");
        Ok(Instance { tag, dataset_key, records, visa_categories: Some(dataset.visa_categories) })
    }
}

/// Escalate per-row cost failures: throttling first, then HTTP errors.
///
/// Unreachable rows are kept with empty metrics.
fn check_cost_rows(rows: &[crate::model::CostRow]) -> Result<(), Error> {
    if rows.is_empty() {
        return Err(Error::CostFetch("cost source returned no rows".into()));
    }

    if let Some(row) = rows.iter().find(|r| r.status == CostRowStatus::RateLimited) {
        return Err(Error::RateLimited(format!("cost source throttled the request for {} (HTTP 429)", row.city)));
    }

    if let Some(row) = rows.iter().find(|r| matches!(r.status, CostRowStatus::HttpStatus { .. })) {
        let status = match &row.status {
            CostRowStatus::HttpStatus { status } => *status,
            _ => 0,
        };
        return Err(Error::CostFetch(format!("cost source failed for {} with HTTP {status}", row.city)));
    }

    let unreachable: Vec<&str> = rows
        .iter()
        .filter(|r| matches!(r.status, CostRowStatus::Unreachable { .. }))
        .map(|r| r.city.as_str())
        .collect();
    if !unreachable.is_empty() {
        tracing::warn!(cities = ?unreachable, "cost source could not reach some cities; keeping them without metrics");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FixedClock;
    use crate::model::{CostRow, SpeedRow, SpeedTables};
    use crate::sources::{CostSource, SourceError, SpeedSource, VisaSource};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeCost {
        calls: AtomicUsize,
        /// Status applied to the first requested city.
        first_status: Mutex<Option<CostRowStatus>>,
    }

    #[async_trait]
    impl CostSource for FakeCost {
        async fn fetch_costs(&self, cities: &[String]) -> Vec<CostRow> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let first_status = self.first_status.lock().unwrap().clone();
            cities
                .iter()
                .enumerate()
                .map(|(i, city)| {
                    let source = format!("https://costs.example/{city}");
                    match (&first_status, i) {
                        (Some(status), 0) => CostRow::failed(city.clone(), source, status.clone()),
                        _ => CostRow {
                            city: city.clone(),
                            rent: Some(800.0 + 400.0 * i as f64),
                            utilities: Some(100.0),
                            internet_flat_fee: Some(30.0),
                            transport: Some(40.0),
                            food_estimate: Some(300.0),
                            monthly_cost: None,
                            source,
                            status: CostRowStatus::Fetched,
                        },
                    }
                })
                .collect()
        }
    }

    #[derive(Default)]
    struct FakeVisa {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl VisaSource for FakeVisa {
        async fn fetch_visa(&self) -> Result<VisaCategories, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SourceError::HttpStatus { status: 403 });
            }
            Ok(VisaCategories::from([
                ("Visa-free countries".to_string(), vec!["Portugal".to_string(), "Japan".to_string()]),
                ("Countries requiring visas".to_string(), vec!["Thailand".to_string()]),
            ]))
        }
    }

    #[derive(Default)]
    struct FakeSpeed {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl SpeedSource for FakeSpeed {
        async fn fetch_speeds(&self) -> Result<SpeedTables, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SourceError::Network("connection reset".into()));
            }
            let row = |country: &str, mbps: f64| SpeedRow { country: country.into(), mbps: Some(mbps) };
            Ok(SpeedTables {
                mobile: vec![row("Portugal", 80.0), row("Japan", 120.0), row("Thailand", 40.0)],
                fixed: vec![row("Portugal", 150.0), row("Japan", 200.0), row("Thailand", 180.0)],
            })
        }
    }

    struct Harness {
        dir: TempDir,
        clock: Arc<FixedClock>,
        cost: Arc<FakeCost>,
        visa: Arc<FakeVisa>,
        speed: Arc<FakeSpeed>,
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    impl Harness {
        fn new() -> Self {
            Self::with(FakeVisa::default(), FakeSpeed::default())
        }

        fn with(visa: FakeVisa, speed: FakeSpeed) -> Self {
            Self {
                dir: TempDir::new().unwrap(),
                clock: Arc::new(FixedClock::new(day(2))),
                cost: Arc::new(FakeCost::default()),
                visa: Arc::new(visa),
                speed: Arc::new(speed),
            }
        }

        fn engine(&self) -> Engine {
            let config = AppConfig {
                cache_dir: self.dir.path().to_path_buf(),
                cities: vec!["Lisbon".into(), "Tokyo".into(), "Bangkok".into()],
                ..Default::default()
            };
            let sources = Sources::new(self.cost.clone(), self.visa.clone(), self.speed.clone());
            Engine::new(config, sources).with_clock(self.clock.clone())
        }

        fn network_calls(&self) -> usize {
            self.cost.calls.load(Ordering::SeqCst)
                + self.visa.calls.load(Ordering::SeqCst)
                + self.speed.calls.load(Ordering::SeqCst)
        }

        fn snapshot_exists(&self, name: &str) -> bool {
            self.dir.path().join(name).exists()
        }
    }

    #[tokio::test]
    async fn test_cache_only_without_snapshot_fails_without_fetching() {
        let h = Harness::new();
        let mut engine = h.engine();
        engine.set_cache_only(true);

        let result = engine.get_or_build(None).await;
        assert!(matches!(result, Err(Error::NoCachedData(_))));
        assert_eq!(h.network_calls(), 0);
    }

    #[tokio::test]
    async fn test_fresh_build_writes_today() {
        let h = Harness::new();
        let mut engine = h.engine();

        let instance = engine.get_or_build(None).await.unwrap();
        assert_eq!(instance.records.len(), 3);
        assert_eq!(instance.tag.as_str(), "20250102");
        assert_eq!(instance.dataset_key, "default");
        assert!(instance.records.iter().all(|r| r.nomad_score().is_some()));
        assert!(instance.visa_categories.is_some());

        assert_eq!(h.cost.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.visa.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.speed.calls.load(Ordering::SeqCst), 1);
        assert!(h.snapshot_exists("combined_default_20250102.csv"));
    }

    #[tokio::test]
    async fn test_in_memory_instance_is_reused() {
        let h = Harness::new();
        let mut engine = h.engine();
        engine.get_or_build(None).await.unwrap();
        engine.get_or_build(None).await.unwrap();
        engine.combined_dataset().await.unwrap();
        assert_eq!(h.network_calls(), 3);
    }

    #[tokio::test]
    async fn test_todays_snapshot_adopted_without_fetching() {
        let h = Harness::new();
        let built = h.engine().get_or_build(None).await.unwrap().clone();

        let mut fresh = h.engine();
        let adopted = fresh.get_or_build(None).await.unwrap();
        assert_eq!(h.network_calls(), 3);
        assert_eq!(adopted.records, built.records);
        assert_eq!(adopted.visa_categories, None);
    }

    #[tokio::test]
    async fn test_stale_snapshot_refetched_and_deleted() {
        let h = Harness::new();
        h.clock.set(day(1));
        h.engine().get_or_build(None).await.unwrap();
        assert!(h.snapshot_exists("combined_default_20250101.csv"));

        h.clock.set(day(2));
        let mut engine = h.engine();
        let instance = engine.get_or_build(None).await.unwrap();
        assert_eq!(instance.tag.as_str(), "20250102");
        assert_eq!(h.cost.calls.load(Ordering::SeqCst), 2);
        assert!(h.snapshot_exists("combined_default_20250102.csv"));
        assert!(!h.snapshot_exists("combined_default_20250101.csv"));
    }

    #[tokio::test]
    async fn test_day_rollover_rebuilds_held_instance() {
        let h = Harness::new();
        let mut engine = h.engine();
        engine.get_or_build(None).await.unwrap();

        h.clock.set(day(3));
        let instance = engine.get_or_build(None).await.unwrap();
        assert_eq!(instance.tag.as_str(), "20250103");
        assert_eq!(h.cost.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_only_falls_back_to_latest_and_keeps_it() {
        let h = Harness::new();
        h.clock.set(day(1));
        h.engine().get_or_build(None).await.unwrap();
        let calls = h.network_calls();

        h.clock.set(day(5));
        let mut engine = h.engine();
        engine.set_cache_only(true);
        let instance = engine.get_or_build(None).await.unwrap();
        assert_eq!(instance.tag.as_str(), "20250101");
        assert_eq!(h.network_calls(), calls);
        assert!(h.snapshot_exists("combined_default_20250101.csv"));
    }

    #[tokio::test]
    async fn test_cache_only_reuses_held_instance_across_days() {
        let h = Harness::new();
        let mut engine = h.engine();
        engine.get_or_build(None).await.unwrap();
        engine.set_cache_only(true);

        h.clock.set(day(9));
        let custom = vec!["Paris".to_string()];
        let instance = engine.get_or_build(Some(&custom)).await.unwrap();
        assert_eq!(instance.tag.as_str(), "20250102");
        assert_eq!(h.network_calls(), 3);
    }

    #[tokio::test]
    async fn test_rate_limited_cost_row_fails() {
        let h = Harness::new();
        *h.cost.first_status.lock().unwrap() = Some(CostRowStatus::RateLimited);
        let mut engine = h.engine();

        let result = engine.get_or_build(None).await;
        assert!(matches!(result, Err(Error::RateLimited(_))));
        assert!(engine.current().is_none());
        assert!(!h.snapshot_exists("combined_default_20250102.csv"));
    }

    #[tokio::test]
    async fn test_http_error_cost_row_fails() {
        let h = Harness::new();
        *h.cost.first_status.lock().unwrap() = Some(CostRowStatus::HttpStatus { status: 503 });
        let result = h.engine().get_or_build(None).await.map(|_| ());
        assert!(matches!(result, Err(Error::CostFetch(_))));
    }

    #[tokio::test]
    async fn test_unreachable_cost_row_is_kept() {
        let h = Harness::new();
        *h.cost.first_status.lock().unwrap() = Some(CostRowStatus::Unreachable { reason: "timeout".into() });
        let mut engine = h.engine();

        let instance = engine.get_or_build(None).await.unwrap();
        let lisbon = instance.records.iter().find(|r| r.city == "Lisbon").unwrap();
        assert_eq!(lisbon.rent, None);
        assert_eq!(lisbon.monthly_cost, Some(0.0));
    }

    #[tokio::test]
    async fn test_visa_failure_degrades_to_empty() {
        let h = Harness::with(FakeVisa { fail: true, ..Default::default() }, FakeSpeed::default());
        let mut engine = h.engine();

        let instance = engine.get_or_build(None).await.unwrap();
        assert!(instance.records.iter().all(|r| !r.visa_free));
        assert!(engine.visa_categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_speed_failure_propagates() {
        let h = Harness::with(FakeVisa::default(), FakeSpeed { fail: true, ..Default::default() });
        let result = h.engine().get_or_build(None).await.map(|_| ());
        assert!(matches!(result, Err(Error::SpeedFetch(_))));
        assert!(!h.snapshot_exists("combined_default_20250102.csv"));
    }

    #[tokio::test]
    async fn test_custom_cities_use_their_own_snapshot() {
        let h = Harness::new();
        let mut engine = h.engine();
        let custom = vec!["Lisbon".to_string(), "Tokyo".to_string()];

        let key = engine.get_or_build(Some(&custom)).await.unwrap().dataset_key.clone();
        assert_ne!(key, "default");
        assert!(h.snapshot_exists(&format!("combined_{key}_20250102.csv")));

        let instance = engine.get_or_build(None).await.unwrap();
        assert_eq!(instance.dataset_key, "default");
        assert_eq!(instance.records.len(), 3);
        assert_eq!(h.cost.calls.load(Ordering::SeqCst), 2);
        assert!(h.snapshot_exists(&format!("combined_{key}_20250102.csv")));
    }

    #[tokio::test]
    async fn test_adopted_snapshot_is_enriched_and_rescored() {
        let h = Harness::new();
        let engine = h.engine();
        let mut new_york = CombinedRecord::from_cost(&CostRow::failed("New York", "", CostRowStatus::Fetched));
        new_york.country = Some("United States".into());
        new_york.monthly_cost = Some(4000.0);
        new_york.avg_internet_mbps = Some(200.0);
        let mut lisbon = CombinedRecord::from_cost(&CostRow::failed("Lisbon", "", CostRowStatus::Fetched));
        lisbon.country = Some("Portugal".into());
        lisbon.region = Some("southern europe".into());
        lisbon.monthly_cost = Some(2000.0);
        lisbon.avg_internet_mbps = Some(100.0);
        engine.store().write(
            &Snapshot {
                tag: engine.today(),
                dataset_key: Some("default".into()),
                records: vec![new_york, lisbon],
            },
            false,
        );

        let mut engine = engine;
        let instance = engine.get_or_build(None).await.unwrap();
        assert_eq!(h.network_calls(), 0);

        let ny = &instance.records[0];
        assert!(ny.visa_free);
        assert_eq!(ny.region.as_deref(), Some("Americas"));
        assert_eq!(instance.records[1].region.as_deref(), Some("Europe"));
        assert_eq!(ny.scores.unwrap().speed_score, Some(100.0));
        assert_eq!(ny.scores.unwrap().cost_score, Some(0.0));
    }

    #[tokio::test]
    async fn test_recommend_rejects_bad_budget_before_fetching() {
        let h = Harness::new();
        let mut engine = h.engine();
        let result = engine.recommend(&RecommendationQuery::new(0.0), None).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(h.network_calls(), 0);
    }

    #[tokio::test]
    async fn test_recommend_end_to_end() {
        let h = Harness::new();
        let mut engine = h.engine();
        let recs = engine.recommend(&RecommendationQuery::new(5000.0), None).await.unwrap();

        let cities: Vec<_> = recs.iter().map(|r| r.city.as_str()).collect();
        assert_eq!(cities, ["Lisbon", "Tokyo"]);
        assert!(recs.iter().all(|r| r.visa_free));
    }

    #[tokio::test]
    async fn test_explorer_views() {
        let h = Harness::new();
        let mut engine = h.engine();

        let costs = engine.cost_of_living(Some("tok")).await.unwrap();
        assert_eq!(costs.len(), 1);
        assert_eq!(costs[0].country.as_deref(), Some("Japan"));

        let speeds = engine.internet_speeds(None).await.unwrap();
        let countries: Vec<_> = speeds.iter().map(|s| s.country.as_str()).collect();
        assert_eq!(countries, ["Japan", "Portugal", "Thailand"]);
        assert_eq!(speeds[0].avg_internet_mbps, Some(160.0));

        let visa = engine.visa_categories().await.unwrap();
        assert_eq!(visa.len(), 2);
        assert_eq!(h.network_calls(), 3);
    }
}

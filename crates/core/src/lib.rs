//! Core engine for nomad-rank.
//!
//! This crate provides:
//! - Row types for the three upstream datasets and the combined table
//! - Source adapter contracts consumed by the orchestrator
//! - Dataset building, city→country merge and region/visa enrichment
//! - Composite scoring and the recommendation filter
//! - Per-day on-disk snapshot cache
//! - The caller-owned [`Engine`] handle that ties it all together
//! - Unified error types and layered configuration

pub mod cache;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod explorer;
pub mod geo;
pub mod merge;
pub mod model;
pub mod recommend;
pub mod scoring;
pub mod sources;

pub use cache::{CacheStore, Clock, DayTag, FixedClock, Snapshot, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use engine::{Engine, Instance};
pub use error::Error;
pub use explorer::{CostOfLivingRow, CountrySpeedRow};
pub use model::{CombinedRecord, CostRow, ScoreCard, SpeedRow, SpeedTables, VisaCategories, VisaRecord};
pub use recommend::{Recommendation, RecommendationFilters, RecommendationQuery};
pub use scoring::Weights;
pub use sources::{CostRowStatus, CostSource, SourceError, Sources, SpeedSource, VisaSource};

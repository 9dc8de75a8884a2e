//! recommend tool implementation.
//!
//! Filters and ranks the day's dataset for a monthly budget.

use nomad_core::recommend::{DEFAULT_MIN_SPEED, DEFAULT_TOP_N};
use nomad_core::{Engine, Recommendation, RecommendationQuery};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::ToolError;

/// Parameters for the recommend tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecommendParams {
    /// Maximum monthly cost of living in USD.
    pub max_budget: f64,

    /// Minimum average internet speed in Mbps (default: 25, 0 disables).
    #[serde(default)]
    pub min_speed: Option<f64>,

    /// Only return cities in visa-free countries (default: true).
    #[serde(default)]
    pub visa_free_only: Option<bool>,

    /// Region to restrict to, e.g. "Europe"; "Global" or omitted means everywhere.
    #[serde(default)]
    pub region: Option<String>,

    /// Maximum number of results (default: 100).
    #[serde(default)]
    pub top_n: Option<usize>,

    /// Cities to build the dataset from instead of the configured list.
    #[serde(default)]
    pub cities: Option<Vec<String>>,
}

impl RecommendParams {
    fn to_query(&self) -> Result<RecommendationQuery, ToolError> {
        let top_n = self.top_n.unwrap_or(DEFAULT_TOP_N);
        if top_n == 0 {
            return Err(ToolError::InvalidInput("top_n must be at least 1".into()));
        }

        Ok(RecommendationQuery {
            max_budget: self.max_budget,
            min_speed: self.min_speed.unwrap_or(DEFAULT_MIN_SPEED),
            visa_free_only: self.visa_free_only.unwrap_or(true),
            region: self.region.clone(),
            top_n,
        })
    }
}

/// Output from the recommend tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecommendOutput {
    /// Query after defaults were applied.
    pub query: RecommendationQuery,
    pub count: usize,
    /// Best match first.
    pub recommendations: Vec<Recommendation>,
}

/// Implementation of the recommend tool.
pub async fn recommend_impl(engine: &Mutex<Engine>, params: RecommendParams) -> Result<CallToolResult, McpError> {
    let query = params.to_query()?;
    let recommendations = engine.lock().await.recommend(&query, params.cities.as_deref()).await?;

    tracing::info!(
        max_budget = query.max_budget,
        region = query.region_filter().unwrap_or("Global"),
        count = recommendations.len(),
        "recommendations served"
    );

    let output = RecommendOutput { count: recommendations.len(), query, recommendations };
    super::json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{Fixture, result_json};

    fn params(max_budget: f64) -> RecommendParams {
        RecommendParams { max_budget, min_speed: None, visa_free_only: None, region: None, top_n: None, cities: None }
    }

    #[tokio::test]
    async fn test_recommend_ranks_visa_free_cities() {
        let fx = Fixture::new();
        let result = recommend_impl(&fx.engine, params(2000.0)).await.unwrap();
        let json = result_json(&result);

        let cities: Vec<&str> = json["recommendations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["city"].as_str().unwrap())
            .collect();
        assert_eq!(cities, vec!["Lisbon", "Tokyo"]);
        assert_eq!(json["count"], 2);
        assert_eq!(json["query"]["min_speed"], 25.0);
        assert_eq!(json["query"]["top_n"], 100);
    }

    #[tokio::test]
    async fn test_recommend_without_visa_filter_includes_bangkok() {
        let fx = Fixture::new();
        let p = RecommendParams { visa_free_only: Some(false), ..params(5000.0) };
        let json = result_json(&recommend_impl(&fx.engine, p).await.unwrap());
        assert_eq!(json["count"], 3);
    }

    #[tokio::test]
    async fn test_recommend_reuses_built_dataset() {
        let fx = Fixture::new();
        recommend_impl(&fx.engine, params(2000.0)).await.unwrap();
        let calls = fx.calls();
        recommend_impl(&fx.engine, RecommendParams { region: Some("Asia".into()), ..params(2000.0) })
            .await
            .unwrap();
        assert_eq!(fx.calls(), calls);
    }

    #[tokio::test]
    async fn test_recommend_rejects_zero_top_n() {
        let fx = Fixture::new();
        let err = recommend_impl(&fx.engine, RecommendParams { top_n: Some(0), ..params(2000.0) })
            .await
            .unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert_eq!(fx.calls(), 0);
    }

    #[tokio::test]
    async fn test_recommend_rejects_non_positive_budget() {
        let fx = Fixture::new();
        let err = recommend_impl(&fx.engine, params(0.0)).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert_eq!(fx.calls(), 0);
    }

    #[tokio::test]
    async fn test_recommend_cache_only_without_snapshot() {
        let fx = Fixture::new();
        fx.engine.lock().await.set_cache_only(true);
        let err = recommend_impl(&fx.engine, params(2000.0)).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
        assert!(err.data.is_some());
    }
}

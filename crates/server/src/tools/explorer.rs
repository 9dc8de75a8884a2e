//! Explorer tools: cost_of_living, internet_speeds and visa_categories.
//!
//! Read-only views over the day's dataset.

use nomad_core::{CostOfLivingRow, CountrySpeedRow, Engine, VisaCategories};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Parameters shared by the cost_of_living and internet_speeds tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExplorerParams {
    /// Case-insensitive substring to match against the city (or country) name.
    #[serde(default)]
    pub query: Option<String>,
}

/// Output from the cost_of_living tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CostOfLivingOutput {
    pub count: usize,
    pub cities: Vec<CostOfLivingRow>,
}

/// Output from the internet_speeds tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InternetSpeedsOutput {
    pub count: usize,
    pub countries: Vec<CountrySpeedRow>,
}

/// Output from the visa_categories tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VisaCategoriesOutput {
    /// Category label to country names; empty when the dataset came from a snapshot.
    pub categories: VisaCategories,
}

pub async fn cost_of_living_impl(engine: &Mutex<Engine>, params: ExplorerParams) -> Result<CallToolResult, McpError> {
    let cities = engine.lock().await.cost_of_living(params.query.as_deref()).await?;
    super::json_result(&CostOfLivingOutput { count: cities.len(), cities })
}

pub async fn internet_speeds_impl(
    engine: &Mutex<Engine>, params: ExplorerParams,
) -> Result<CallToolResult, McpError> {
    let countries = engine.lock().await.internet_speeds(params.query.as_deref()).await?;
    super::json_result(&InternetSpeedsOutput { count: countries.len(), countries })
}

pub async fn visa_categories_impl(engine: &Mutex<Engine>) -> Result<CallToolResult, McpError> {
    let categories = engine.lock().await.visa_categories().await?;
    super::json_result(&VisaCategoriesOutput { categories })
}

//! combined_dataset tool implementation.
//!
//! Returns the scored combined table for the configured cities.

use nomad_core::{CombinedRecord, DayTag, Engine};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::ToolError;

/// Parameters for the combined_dataset tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DatasetParams {
    /// Return at most this many rows.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Output from the combined_dataset tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DatasetOutput {
    /// Day the data belongs to (YYYYMMDD).
    pub tag: DayTag,
    pub dataset_key: String,
    /// Total rows before `limit` was applied.
    pub rows: usize,
    pub records: Vec<CombinedRecord>,
}

/// Implementation of the combined_dataset tool.
pub async fn dataset_impl(engine: &Mutex<Engine>, params: DatasetParams) -> Result<CallToolResult, McpError> {
    if params.limit == Some(0) {
        return Err(ToolError::InvalidInput("limit must be at least 1".into()).into());
    }

    let mut engine = engine.lock().await;
    let instance = engine.get_or_build(None).await?;

    let rows = instance.records.len();
    let mut records = instance.records.clone();
    if let Some(limit) = params.limit {
        records.truncate(limit);
    }

    let output = DatasetOutput { tag: instance.tag.clone(), dataset_key: instance.dataset_key.clone(), rows, records };
    super::json_result(&output)
}

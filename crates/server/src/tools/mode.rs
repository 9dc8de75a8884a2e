//! set_cache_only tool implementation.

use nomad_core::Engine;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Parameters for the set_cache_only tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SetCacheOnlyParams {
    /// When true, never contact upstream sources; serve the newest snapshot on disk.
    pub enabled: bool,
}

/// Output from the set_cache_only tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SetCacheOnlyOutput {
    pub cache_only: bool,
}

/// Implementation of the set_cache_only tool.
pub async fn set_cache_only_impl(
    engine: &Mutex<Engine>, params: SetCacheOnlyParams,
) -> Result<CallToolResult, McpError> {
    let mut engine = engine.lock().await;
    engine.set_cache_only(params.enabled);
    super::json_result(&SetCacheOnlyOutput { cache_only: engine.cache_only() })
}

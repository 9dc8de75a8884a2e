//! MCP tool implementations.
//!
//! Each tool takes the shared engine, locks it for the duration of the call
//! and returns its output as pretty-printed JSON text.

pub mod dataset;
pub mod explorer;
pub mod mode;
pub mod recommend;

#[cfg(test)]
pub(crate) mod testing;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

pub use dataset::DatasetParams;
pub use explorer::ExplorerParams;
pub use mode::SetCacheOnlyParams;
pub use recommend::RecommendParams;

/// Wrap `output` as a successful JSON text result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

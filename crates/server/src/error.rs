//! Structured errors raised by the server layer itself.
//!
//! Engine failures convert through `nomad_core::Error`; these cover what
//! happens around them.

use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid tool parameters (e.g., a zero result cap).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Tool output could not be encoded.
    #[error("SERIALIZE_FAILED: {0}")]
    Serialize(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let code = match &err {
            ToolError::InvalidInput(_) => -32602,
            ToolError::Serialize(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::Serialize(err.to_string())
    }
}

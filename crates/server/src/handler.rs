//! MCP server handler implementation.
//!
//! Routes tool calls to the implementations in [`crate::tools`], all of which
//! share one engine behind an async mutex.

use std::sync::Arc;

use nomad_core::Engine;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use tokio::sync::Mutex;

use crate::tools::{
    DatasetParams, ExplorerParams, RecommendParams, SetCacheOnlyParams, dataset::dataset_impl, explorer,
    mode::set_cache_only_impl, recommend::recommend_impl,
};

/// The main MCP server handler for nomad-rank.
#[derive(Clone)]
pub struct NomadServer {
    tool_router: ToolRouter<Self>,
    engine: Arc<Mutex<Engine>>,
}

#[tool_router]
impl NomadServer {
    pub fn new(engine: Engine) -> Self {
        Self { tool_router: Self::tool_router(), engine: Arc::new(Mutex::new(engine)) }
    }

    /// Rank cities that fit a monthly budget.
    ///
    /// Builds (or reuses) today's dataset before filtering.
    #[tool(
        description = "Recommend cities for a monthly budget in USD. Filters by minimum internet speed, visa-free access and region, ranked by composite nomad score."
    )]
    async fn recommend(&self, params: Parameters<RecommendParams>) -> Result<CallToolResult, McpError> {
        recommend_impl(&self.engine, params.0).await
    }

    #[tool(description = "Return today's combined, scored city table (cost, visa, internet speed).")]
    async fn combined_dataset(&self, params: Parameters<DatasetParams>) -> Result<CallToolResult, McpError> {
        dataset_impl(&self.engine, params.0).await
    }

    #[tool(
        description = "Enable or disable cache-only mode. In cache-only mode no upstream site is contacted and the newest snapshot on disk is served."
    )]
    async fn set_cache_only(&self, params: Parameters<SetCacheOnlyParams>) -> Result<CallToolResult, McpError> {
        set_cache_only_impl(&self.engine, params.0).await
    }

    #[tool(description = "Monthly cost breakdown per city, optionally filtered by a city name substring.")]
    async fn cost_of_living(&self, params: Parameters<ExplorerParams>) -> Result<CallToolResult, McpError> {
        explorer::cost_of_living_impl(&self.engine, params.0).await
    }

    #[tool(description = "Mobile and fixed broadband speeds per country, optionally filtered by a country substring.")]
    async fn internet_speeds(&self, params: Parameters<ExplorerParams>) -> Result<CallToolResult, McpError> {
        explorer::internet_speeds_impl(&self.engine, params.0).await
    }

    #[tool(description = "Visa requirement categories for the home passport, mapping each category to its countries.")]
    async fn visa_categories(&self) -> Result<CallToolResult, McpError> {
        explorer::visa_categories_impl(&self.engine).await
    }
}

impl ServerHandler for NomadServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "nomad-rank".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Daily-cached digital nomad city rankings. Call recommend with a max_budget; \
                 use set_cache_only to stay offline."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

//! MCP Server implementation and lifecycle management.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/` with one file per tool.
//! Each tool defines:
//! - Parameters struct (for rmcp)
//! - `execute()` method (core logic)
//! - `http_handler()` method (called via ToolRegistry for HTTP transport)
//!
//! All tools share one [`UpdatePipeline`], which owns the tracker client.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use super::error::Result as ServerResult;
use crate::domains::tools::build_tool_router;
use crate::domains::tracker::{TrackerApi, UpdatePipeline, YouTrackClient};

#[cfg(feature = "http")]
use crate::domains::tools::ToolRegistry;

const INSTRUCTIONS: &str = "Issue tracker tools. Use get_issue to inspect an issue, \
     get_field_values to see which values a project field accepts, and update_issue \
     to change fields. update_issue applies each change separately and reports which \
     ones were rejected, so a partial result is not a failure: do not resend changes \
     that were already applied.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Shared update pipeline (and tracker client).
    #[cfg_attr(not(feature = "http"), allow(dead_code))]
    pipeline: UpdatePipeline,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server talking to the configured YouTrack instance.
    pub fn new(config: Config) -> ServerResult<Self> {
        let client = YouTrackClient::new(&config.tracker, &config.credentials)?;
        info!("Tracker client ready for {}", client.base_url());
        Ok(Self::with_api(config, Arc::new(client)))
    }

    /// Create a server on top of an arbitrary tracker implementation.
    pub fn with_api(config: Config, api: Arc<dyn TrackerApi>) -> Self {
        let pipeline = UpdatePipeline::new(api);

        Self {
            tool_router: build_tool_router::<Self>(pipeline.clone()),
            config: Arc::new(config),
            pipeline,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Server instructions sent to clients on initialize.
    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, String> {
        let registry = ToolRegistry::new(self.pipeline.clone());
        registry.call_tool(name, arguments).await
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

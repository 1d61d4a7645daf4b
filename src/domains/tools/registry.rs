//! Tool Registry - tool metadata and HTTP dispatch.

#[cfg(feature = "http")]
use tracing::warn;

use rmcp::model::Tool;

use super::definitions::{GetFieldValuesTool, GetIssueTool, UpdateIssueTool};
use crate::domains::tracker::UpdatePipeline;

#[cfg(feature = "http")]
use super::ToolError;

/// Tool registry - lists tools and dispatches HTTP tool calls.
pub struct ToolRegistry {
    #[cfg_attr(not(feature = "http"), allow(dead_code))]
    pipeline: UpdatePipeline,
}

impl ToolRegistry {
    pub fn new(pipeline: UpdatePipeline) -> Self {
        Self { pipeline }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![
            UpdateIssueTool::NAME,
            GetIssueTool::NAME,
            GetFieldValuesTool::NAME,
        ]
    }

    /// Get all tools as Tool models (metadata).
    pub fn get_all_tools() -> Vec<Tool> {
        vec![
            UpdateIssueTool::to_tool(),
            GetIssueTool::to_tool(),
            GetFieldValuesTool::to_tool(),
        ]
    }

    /// Dispatch an HTTP tool call to the appropriate handler.
    ///
    /// `Err` means the call could not be dispatched at all; tool-level
    /// failures come back as `Ok` with `isError` set.
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let dispatched = match name {
            UpdateIssueTool::NAME => UpdateIssueTool::http_handler(arguments, &self.pipeline).await,
            GetIssueTool::NAME => GetIssueTool::http_handler(arguments, &self.pipeline).await,
            GetFieldValuesTool::NAME => {
                GetFieldValuesTool::http_handler(arguments, &self.pipeline).await
            }
            _ => {
                warn!("Unknown tool requested: {}", name);
                return Err(ToolError::not_found(name).to_string());
            }
        };
        dispatched.map_err(|e| ToolError::invalid_arguments(e).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tracker::mock::MockTracker;
    use std::sync::Arc;

    fn registry() -> ToolRegistry {
        let api = MockTracker::new()
            .with_issue("DEMO-1")
            .with_enum_field("DEMO", "State", &["Open", "Fixed"]);
        ToolRegistry::new(UpdatePipeline::new(Arc::new(api)))
    }

    #[test]
    fn test_registry_tool_names() {
        let names = registry().tool_names();
        assert_eq!(names, vec!["update_issue", "get_issue", "get_field_values"]);
        assert_eq!(ToolRegistry::get_all_tools().len(), names.len());
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_registry_call_update() {
        let registry = registry();
        let result = tokio_test::block_on(registry.call_tool(
            "update_issue",
            serde_json::json!({ "issue_id": "DEMO-1", "state": "Fixed" }),
        ))
        .unwrap();
        assert_eq!(result["isError"], false);
        assert_eq!(result["structuredContent"]["status"], "success");
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_registry_call_errors() {
        let registry = registry();
        let unknown = tokio_test::block_on(registry.call_tool("unknown", serde_json::json!({})));
        assert_eq!(unknown.unwrap_err(), "Tool not found: unknown");

        let missing_id = tokio_test::block_on(
            registry.call_tool("get_issue", serde_json::json!({ "project": "DEMO" })),
        );
        assert!(missing_id.unwrap_err().starts_with("Invalid arguments"));
    }
}

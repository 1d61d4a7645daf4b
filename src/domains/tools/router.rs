//! Tool Router - builds the rmcp ToolRouter for the STDIO transport.
//!
//! Each tool knows how to create its own route; they all share the pipeline.

use rmcp::handler::server::tool::ToolRouter;

use super::definitions::{GetFieldValuesTool, GetIssueTool, UpdateIssueTool};
use crate::domains::tracker::UpdatePipeline;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(pipeline: UpdatePipeline) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(UpdateIssueTool::create_route(pipeline.clone()))
        .with_route(GetIssueTool::create_route(pipeline.clone()))
        .with_route(GetFieldValuesTool::create_route(pipeline))
}

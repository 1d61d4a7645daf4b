//! Issue read tool.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use super::common::{error_result, resolve_issue, structured_result};
use crate::domains::tracker::{IssueSnapshot, UpdatePipeline, refresh::refresh};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetIssueParams {
    #[schemars(description = "Issue id, e.g. 'PROJ-123'")]
    pub issue_id: String,

    #[schemars(description = "Project short name; only needed for internal ids like '2-15'")]
    #[serde(default)]
    pub project: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GetIssueTool;

impl GetIssueTool {
    pub const NAME: &'static str = "get_issue";

    pub const DESCRIPTION: &'static str = "Read an issue's summary, description, custom field values (State, Priority, Assignee, ...) and tags.";

    #[instrument(skip_all, fields(issue = %params.issue_id))]
    pub async fn execute(params: &GetIssueParams, pipeline: &UpdatePipeline) -> CallToolResult {
        info!("Get issue tool called for {}", params.issue_id);

        let issue = match resolve_issue(&params.issue_id, params.project.as_deref()) {
            Ok(issue) => issue,
            Err(e) => return error_result(&e.to_string()),
        };

        match refresh(pipeline.api().as_ref(), &issue).await {
            Ok(snapshot) => structured_result(describe(&snapshot), &snapshot, false),
            Err(e) => error_result(&format!("Failed to read {}: {}", issue.id(), e)),
        }
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        pipeline: &UpdatePipeline,
    ) -> Result<serde_json::Value, String> {
        let params: GetIssueParams = serde_json::from_value(arguments)
            .map_err(|e| format!("{}: {}", Self::NAME, e))?;
        let result = Self::execute(&params, pipeline).await;
        Ok(super::common::to_http_response(result))
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GetIssueParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    pub fn create_route<S>(pipeline: UpdatePipeline) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let pipeline = pipeline.clone();
            async move {
                let params: GetIssueParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(Self::execute(&params, &pipeline).await)
            }
            .boxed()
        })
    }
}

fn describe(snapshot: &IssueSnapshot) -> String {
    let mut out = format!(
        "{}: {}",
        snapshot.id,
        snapshot.summary.as_deref().unwrap_or("(no summary)")
    );
    for field in &snapshot.fields {
        out.push_str(&format!(
            "\n{}: {}",
            field.name,
            field.value.as_deref().unwrap_or("-")
        ));
    }
    if !snapshot.tags.is_empty() {
        out.push_str(&format!("\nTags: {}", snapshot.tags.join(", ")));
    }
    if let Some(description) = snapshot.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("\n\n{}", description));
    }
    out
}

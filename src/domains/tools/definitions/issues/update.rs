//! Issue update tool.
//!
//! Applies each requested change as its own tracker call and reports which
//! ones were rejected. For rejected values of State, Priority or Type the
//! report lists the values the project accepts.

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
use crate::domains::tracker::{UpdatePipeline, UpdateRequest, UpdateResult, UpdateStatus};

/// A custom field assignment, e.g. `{"name": "Fix versions", "value": "2.1"}`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CustomFieldParam {
    #[schemars(description = "Field name as configured in the project")]
    pub name: String,
    #[schemars(description = "New value")]
    pub value: String,
}

/// Parameters for issue updates. Only the fields given are changed.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpdateIssueParams {
    #[schemars(description = "Issue id, e.g. 'PROJ-123'")]
    pub issue_id: String,

    #[schemars(description = "Project short name; only needed for internal ids like '2-15'")]
    #[serde(default)]
    pub project: Option<String>,

    #[schemars(description = "New summary (title)")]
    #[serde(default)]
    pub summary: Option<String>,

    #[schemars(description = "New description")]
    #[serde(default)]
    pub description: Option<String>,

    #[schemars(description = "New state, e.g. 'In Progress'")]
    #[serde(default)]
    pub state: Option<String>,

    #[schemars(description = "New priority, e.g. 'Critical'")]
    #[serde(default)]
    pub priority: Option<String>,

    #[schemars(description = "New issue type, e.g. 'Bug'")]
    #[serde(default, alias = "type")]
    pub issue_type: Option<String>,

    #[schemars(description = "Assignee login")]
    #[serde(default)]
    pub assignee: Option<String>,

    #[schemars(description = "Estimate in minutes")]
    #[serde(default)]
    pub estimate_minutes: Option<u32>,

    #[schemars(description = "Tags to add")]
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    #[schemars(description = "Other project fields to set, applied in list order")]
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldParam>,

    /// Argument keys in the order the caller sent them.
    #[serde(skip)]
    key_order: Vec<String>,
}

/// Change-carrying argument keys, in the order used when the caller's order is unknown.
const CHANGE_KEYS: [&str; 9] = [
    "summary",
    "description",
    "state",
    "priority",
    "issue_type",
    "assignee",
    "estimate_minutes",
    "tags",
    "custom_fields",
];

impl UpdateIssueParams {
    /// Parse tool arguments, remembering the order of their keys.
    pub fn from_arguments(arguments: serde_json::Value) -> Result<Self, serde_json::Error> {
        let key_order = arguments
            .as_object()
            .map(|args| {
                args.keys()
                    .map(|k| if k == "type" { "issue_type".to_string() } else { k.clone() })
                    .collect()
            })
            .unwrap_or_default();
        let mut params: Self = serde_json::from_value(arguments)?;
        params.key_order = key_order;
        Ok(params)
    }

    fn position(&self, key: &str) -> usize {
        self.key_order
            .iter()
            .position(|k| k == key)
            .unwrap_or(usize::MAX)
    }

    /// Changes in the order the caller listed them. Custom fields keep their
    /// list order at the position of the `custom_fields` key.
    pub fn to_request(&self) -> UpdateRequest {
        let mut keys = CHANGE_KEYS;
        keys.sort_by_key(|key| self.position(key));

        let mut request = UpdateRequest::new();
        for key in keys {
            request = match key {
                "summary" => match &self.summary {
                    Some(summary) => request.summary(summary),
                    None => request,
                },
                "description" => match &self.description {
                    Some(description) => request.description(description),
                    None => request,
                },
                "state" => match &self.state {
                    Some(state) => request.state(state),
                    None => request,
                },
                "priority" => match &self.priority {
                    Some(priority) => request.priority(priority),
                    None => request,
                },
                "issue_type" => match &self.issue_type {
                    Some(issue_type) => request.issue_type(issue_type),
                    None => request,
                },
                "assignee" => match &self.assignee {
                    Some(assignee) => request.assignee(assignee),
                    None => request,
                },
                "estimate_minutes" => match self.estimate_minutes {
                    Some(minutes) => request.estimate_minutes(minutes),
                    None => request,
                },
                "tags" => match &self.tags {
                    Some(tags) => request.tags(tags.iter().cloned()),
                    None => request,
                },
                _ => self
                    .custom_fields
                    .iter()
                    .fold(request, |request, field| request.custom(&field.name, &field.value)),
            };
        }
        request
    }
}

#[derive(Debug, Clone)]
pub struct UpdateIssueTool;

impl UpdateIssueTool {
    pub const NAME: &'static str = "update_issue";

    pub const DESCRIPTION: &'static str = "Update fields of an issue (summary, description, state, priority, type, assignee, estimate, tags, custom fields). Each change is applied separately, in the order the fields are given: the result lists how many were applied, explains each rejected change and, for State, Priority and Type, the values the project accepts. The issue's state after the update is included. Do not resend changes that were already applied.";

    #[instrument(skip_all, fields(issue = %params.issue_id))]
    pub async fn execute(params: &UpdateIssueParams, pipeline: &UpdatePipeline) -> CallToolResult {
        info!("Update issue tool called for {}", params.issue_id);

        let issue = match resolve_issue(&params.issue_id, params.project.as_deref()) {
            Ok(issue) => issue,
            Err(e) => return error_result(&e.to_string()),
        };

        match pipeline.run(&issue, &params.to_request()).await {
            Ok(result) => {
                let is_error = result.status == UpdateStatus::Failure;
                structured_result(summarize(&result), &result, is_error)
            }
            Err(e) => error_result(&e.to_string()),
        }
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        pipeline: &UpdatePipeline,
    ) -> Result<serde_json::Value, String> {
        let params = UpdateIssueParams::from_arguments(arguments)
            .map_err(|e| format!("{}: {}", Self::NAME, e))?;
        let result = Self::execute(&params, pipeline).await;
        Ok(super::common::to_http_response(result))
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<UpdateIssueParams>(),
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
                let params = UpdateIssueParams::from_arguments(serde_json::Value::Object(args))
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(Self::execute(&params, &pipeline).await)
            }
            .boxed()
        })
    }
}

fn status_label(status: UpdateStatus) -> &'static str {
    match status {
        UpdateStatus::Success => "updated",
        UpdateStatus::PartialSuccess => "partially updated",
        UpdateStatus::Failure => "not updated",
        UpdateStatus::NoOp => "unchanged",
    }
}

/// Human-readable report: counts, one line per rejected change, then the
/// issue's current fields.
fn summarize(result: &UpdateResult) -> String {
    let mut out = format!(
        "{} {}: {} of {} change(s) applied",
        result.issue_id,
        status_label(result.status),
        result.succeeded,
        result.attempted
    );

    for diagnostic in &result.diagnostics {
        out.push_str(&format!(
            "\n- '{}' failed: {}",
            diagnostic.command, diagnostic.error
        ));
        if !diagnostic.hint.is_empty() {
            out.push_str(&format!("\n  Allowed values: {}", diagnostic.hint.join(", ")));
        }
    }

    for warning in &result.warnings {
        out.push_str(&format!("\nWarning: {}", warning));
    }

    if let Some(snapshot) = &result.snapshot {
        out.push_str("\n\nCurrent state:");
        if let Some(summary) = &snapshot.summary {
            out.push_str(&format!("\n  Summary: {}", summary));
        }
        for field in &snapshot.fields {
            out.push_str(&format!(
                "\n  {}: {}",
                field.name,
                field.value.as_deref().unwrap_or("-")
            ));
        }
        if !snapshot.tags.is_empty() {
            out.push_str(&format!("\n  Tags: {}", snapshot.tags.join(", ")));
        }
    }

    out
}

//! Field value discovery tool.
//!
//! Lists the values a project accepts for an enumerated field such as State
//! or Priority, in the order the project declares them.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use super::common::{error_result, structured_result};
use crate::domains::tracker::{
    FieldLookup, UpdatePipeline, discovery::list_values, model::validate_project,
};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetFieldValuesParams {
    #[schemars(description = "Project short name, e.g. 'PROJ'")]
    pub project: String,

    #[schemars(description = "Field name, e.g. 'State' or 'Priority'")]
    pub field: String,
}

#[derive(Debug, Clone)]
pub struct GetFieldValuesTool;

impl GetFieldValuesTool {
    pub const NAME: &'static str = "get_field_values";

    pub const DESCRIPTION: &'static str = "List the values a project accepts for an enumerated field (State, Priority, Type or a custom enum field), in the project's order. Use before update_issue when unsure of exact value names.";

    #[instrument(skip_all, fields(project = %params.project, field = %params.field))]
    pub async fn execute(params: &GetFieldValuesParams, pipeline: &UpdatePipeline) -> CallToolResult {
        info!("Listing values of {} in {}", params.field, params.project);

        let project = params.project.trim();
        let field = params.field.trim();
        if project.is_empty() || field.is_empty() {
            return error_result("Both 'project' and 'field' are required");
        }
        if let Err(e) = validate_project(project) {
            return error_result(&e.to_string());
        }

        match list_values(pipeline.api().as_ref(), project, field).await {
            FieldLookup::Found(set) => {
                let summary = format!(
                    "{} in {} accepts: {}",
                    set.field,
                    set.project,
                    set.display_names().join(", ")
                );
                structured_result(summary, &set, false)
            }
            FieldLookup::Unavailable(reason) => error_result(&format!(
                "Cannot list values of '{}' in {}: {}",
                field, project, reason
            )),
        }
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        pipeline: &UpdatePipeline,
    ) -> Result<serde_json::Value, String> {
        let params: GetFieldValuesParams = serde_json::from_value(arguments)
            .map_err(|e| format!("{}: {}", Self::NAME, e))?;
        let result = Self::execute(&params, pipeline).await;
        Ok(super::common::to_http_response(result))
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GetFieldValuesParams>(),
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
                let params: GetFieldValuesParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(Self::execute(&params, &pipeline).await)
            }
            .boxed()
        })
    }
}

//! Helpers shared by the issue tools.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use tracing::warn;

use crate::domains::tracker::{IssueRef, TrackerResult};

/// Parse an issue id, applying an explicit project override when given.
pub fn resolve_issue(issue_id: &str, project: Option<&str>) -> TrackerResult<IssueRef> {
    let issue = IssueRef::parse(issue_id)?;
    Ok(match project {
        Some(project) => issue.with_project(project)?,
        None => issue,
    })
}

/// Create an error result with a formatted message.
pub fn error_result(message: &str) -> CallToolResult {
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(message.to_string())])
}

/// Create a result carrying a text summary plus `data` as structured content.
///
/// Falls back to text only if `data` cannot be serialized.
pub fn structured_result<T: Serialize>(summary: String, data: &T, is_error: bool) -> CallToolResult {
    match serde_json::to_value(data) {
        Ok(structured) => CallToolResult {
            content: vec![Content::text(summary)],
            structured_content: Some(structured),
            is_error: Some(is_error),
            meta: None,
        },
        Err(e) => {
            warn!("Failed to serialize structured content: {}", e);
            if is_error {
                CallToolResult::error(vec![Content::text(summary)])
            } else {
                CallToolResult::success(vec![Content::text(summary)])
            }
        }
    }
}

/// Render a tool result the way the HTTP transport returns it.
#[cfg(feature = "http")]
pub fn to_http_response(result: CallToolResult) -> serde_json::Value {
    let mut response = serde_json::json!({
        "content": result.content,
        "isError": result.is_error.unwrap_or(false)
    });
    if let (Some(structured), Some(obj)) = (result.structured_content, response.as_object_mut()) {
        obj.insert("structuredContent".to_string(), structured);
    }
    response
}

#[cfg(test)]
pub(crate) fn text_of(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| c.as_text().map(|t| t.text.clone()))
        .collect::<Vec<_>>()
        .join("\n")
}

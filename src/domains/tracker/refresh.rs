//! State refresh: read the issue back after mutation.

use serde_json::Value;
use tracing::{instrument, warn};

use super::client::TrackerApi;
use super::error::{TrackerError, TrackerResult};
use super::model::{IssueRef, IssueSnapshot, SnapshotField};

/// Fetch the authoritative state of an issue.
#[instrument(skip(api), fields(issue = %issue.id()))]
pub async fn refresh(api: &dyn TrackerApi, issue: &IssueRef) -> TrackerResult<IssueSnapshot> {
    let raw = api.get_issue(issue).await?;
    parse_snapshot(&raw, issue).inspect_err(|e| warn!("Could not read issue state: {}", e))
}

/// Convert the tracker's issue JSON into an [`IssueSnapshot`].
pub fn parse_snapshot(raw: &Value, issue: &IssueRef) -> TrackerResult<IssueSnapshot> {
    let obj = raw
        .as_object()
        .ok_or_else(|| TrackerError::invalid_response("issue is not a JSON object"))?;

    let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

    let fields = obj
        .get("customFields")
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .filter_map(|f| {
                    let name = f.get("name")?.as_str()?.to_string();
                    let value = f.get("value").and_then(render_value);
                    Some(SnapshotField { name, value })
                })
                .collect()
        })
        .unwrap_or_default();

    let tags = obj
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.get("name").and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    Ok(IssueSnapshot {
        id: text("idReadable")
            .or_else(|| text("id"))
            .unwrap_or_else(|| issue.id().to_string()),
        project: obj
            .get("project")
            .and_then(|p| p.get("shortName"))
            .and_then(Value::as_str)
            .map(str::to_string),
        summary: text("summary"),
        description: text("description"),
        fields,
        tags,
    })
}

/// Render a custom field value the way the tracker would display it.
fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().filter_map(render_value).collect();
            (!rendered.is_empty()).then(|| rendered.join(", "))
        }
        Value::Object(obj) => ["name", "login", "presentation", "text", "fullName", "minutes"]
            .iter()
            .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
            .and_then(render_value),
    }
}

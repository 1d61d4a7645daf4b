//! Deterministic in-memory tracker for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use super::client::TrackerApi;
use super::error::{TrackerError, TrackerResult};
use super::model::{BasicFields, IssueRef};

#[derive(Debug, Default, Clone)]
struct MockIssue {
    summary: Option<String>,
    description: Option<String>,
    fields: Vec<(String, String)>,
    tags: Vec<String>,
}

#[derive(Debug, Default)]
struct MockState {
    issues: HashMap<String, MockIssue>,
    enum_fields: Vec<(String, String, Vec<String>)>,
    raw_project_fields: HashMap<String, Value>,
    sent_commands: Vec<String>,
}

/// In-memory [`TrackerApi`] that validates enum values and counts calls.
#[derive(Debug, Default)]
pub struct MockTracker {
    state: Mutex<MockState>,
    command_failure: Option<(u16, String)>,
    fail_discovery: bool,
    fail_refresh: bool,
    basic_calls: AtomicUsize,
    command_calls: AtomicUsize,
    field_lookups: AtomicUsize,
    refreshes: AtomicUsize,
}

impl MockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(mut self, id: &str) -> Self {
        self.state
            .get_mut()
            .unwrap()
            .issues
            .insert(id.to_string(), MockIssue {
                summary: Some(format!("Issue {id}")),
                ..MockIssue::default()
            });
        self
    }

    pub fn with_field_value(mut self, id: &str, field: &str, value: &str) -> Self {
        let state = self.state.get_mut().unwrap();
        let issue = state.issues.entry(id.to_string()).or_default();
        set_field(issue, field, value);
        self
    }

    /// Declare an enumerated field; values get ordinals in the given order.
    pub fn with_enum_field(mut self, project: &str, field: &str, values: &[&str]) -> Self {
        self.state.get_mut().unwrap().enum_fields.push((
            project.to_string(),
            field.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        ));
        self
    }

    /// Serve raw field configuration JSON for a project.
    pub fn with_project_fields(mut self, project: &str, fields: Value) -> Self {
        self.state
            .get_mut()
            .unwrap()
            .raw_project_fields
            .insert(project.to_string(), fields);
        self
    }

    pub fn fail_commands_with(mut self, status: u16, message: &str) -> Self {
        self.command_failure = Some((status, message.to_string()));
        self
    }

    pub fn fail_field_discovery(mut self) -> Self {
        self.fail_discovery = true;
        self
    }

    pub fn fail_refresh(mut self) -> Self {
        self.fail_refresh = true;
        self
    }

    pub fn basic_calls(&self) -> usize {
        self.basic_calls.load(Ordering::SeqCst)
    }

    pub fn command_calls(&self) -> usize {
        self.command_calls.load(Ordering::SeqCst)
    }

    pub fn field_lookups(&self) -> usize {
        self.field_lookups.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Every command query received, in call order.
    pub fn sent_commands(&self) -> Vec<String> {
        self.state.lock().unwrap().sent_commands.clone()
    }

    pub fn total_calls(&self) -> usize {
        self.basic_calls() + self.command_calls() + self.field_lookups() + self.refreshes()
    }
}

fn set_field(issue: &mut MockIssue, field: &str, value: &str) {
    match issue
        .fields
        .iter_mut()
        .find(|(name, _)| name.eq_ignore_ascii_case(field))
    {
        Some((_, current)) => *current = value.to_string(),
        None => issue.fields.push((field.to_string(), value.to_string())),
    }
}

fn strip_braces(text: &str) -> &str {
    text.strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .unwrap_or(text)
}

/// Split `Field value` / `{Multi word} value` into its parts.
fn parse_command(query: &str) -> (String, String) {
    let query = query.trim();
    let (field, rest) = if query.starts_with('{') {
        match query.find('}') {
            Some(end) => (&query[1..end], &query[end + 1..]),
            None => (query, ""),
        }
    } else {
        query.split_once(' ').unwrap_or((query, ""))
    };
    (field.to_string(), strip_braces(rest.trim()).to_string())
}

#[async_trait]
impl TrackerApi for MockTracker {
    async fn update_basic_fields(&self, issue: &IssueRef, fields: &BasicFields) -> TrackerResult<()> {
        self.basic_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let current = state
            .issues
            .get_mut(issue.id())
            .ok_or_else(|| TrackerError::api(404, "Issue not found"))?;
        if let Some(summary) = &fields.summary {
            current.summary = Some(summary.clone());
        }
        if let Some(description) = &fields.description {
            current.description = Some(description.clone());
        }
        Ok(())
    }

    async fn apply_command(&self, issue: &IssueRef, query: &str) -> TrackerResult<()> {
        self.command_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        state.sent_commands.push(query.to_string());
        if let Some((status, message)) = &self.command_failure {
            return Err(TrackerError::api(*status, message.clone()));
        }

        let project = issue.project().unwrap_or_default().to_string();

        if let Some(tags) = query.strip_prefix("tag ") {
            let current = state
                .issues
                .get_mut(issue.id())
                .ok_or_else(|| TrackerError::api(404, "Issue not found"))?;
            for tag in tags.split(" tag ") {
                current.tags.push(strip_braces(tag.trim()).to_string());
            }
            return Ok(());
        }

        let (field, value) = parse_command(query);
        let allowed = state
            .enum_fields
            .iter()
            .find(|(p, f, _)| *p == project && f.eq_ignore_ascii_case(&field))
            .map(|(_, _, values)| values.clone());
        if let Some(allowed) = allowed {
            if !allowed.contains(&value) {
                return Err(TrackerError::api(
                    400,
                    format!("Unknown {field} value: {value}"),
                ));
            }
        }

        let current = state
            .issues
            .get_mut(issue.id())
            .ok_or_else(|| TrackerError::api(404, "Issue not found"))?;
        set_field(current, &field, &value);
        Ok(())
    }

    async fn project_custom_fields(&self, project: &str) -> TrackerResult<Value> {
        self.field_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_discovery {
            return Err(TrackerError::api(403, "Not allowed to read project settings"));
        }

        let state = self.state.lock().unwrap();
        if let Some(raw) = state.raw_project_fields.get(project) {
            return Ok(raw.clone());
        }

        let fields: Vec<Value> = state
            .enum_fields
            .iter()
            .filter(|(p, _, _)| p == project)
            .map(|(_, field, values)| {
                let values: Vec<Value> = values
                    .iter()
                    .enumerate()
                    .map(|(ordinal, name)| json!({ "name": name, "ordinal": ordinal }))
                    .collect();
                json!({ "field": { "name": field }, "bundle": { "values": values } })
            })
            .collect();

        if fields.is_empty() {
            return Err(TrackerError::api(404, format!("Project not found: {project}")));
        }
        Ok(Value::Array(fields))
    }

    async fn get_issue(&self, issue: &IssueRef) -> TrackerResult<Value> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if self.fail_refresh {
            return Err(TrackerError::Http {
                url: format!("mock://issues/{}", issue.id()),
                message: "connection failed".to_string(),
                transient: true,
            });
        }

        let state = self.state.lock().unwrap();
        let current = state
            .issues
            .get(issue.id())
            .ok_or_else(|| TrackerError::api(404, "Issue not found"))?;

        let custom_fields: Vec<Value> = current
            .fields
            .iter()
            .map(|(name, value)| json!({ "name": name, "value": { "name": value } }))
            .collect();
        let tags: Vec<Value> = current.tags.iter().map(|t| json!({ "name": t })).collect();

        Ok(json!({
            "idReadable": issue.id(),
            "summary": current.summary,
            "description": current.description,
            "project": { "shortName": issue.project() },
            "tags": tags,
            "customFields": custom_fields,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("Priority High"), ("Priority".into(), "High".into()));
        assert_eq!(
            parse_command("State {In Progress}"),
            ("State".into(), "In Progress".into())
        );
        assert_eq!(
            parse_command("{Fix versions} 2.1"),
            ("Fix versions".into(), "2.1".into())
        );
    }
}

//! Command builder: turns an [`UpdateRequest`] into tracker commands.
//!
//! Summary and description are replaced through a direct call; every other
//! attribute becomes one command string, e.g. `Priority High` or
//! `State {In Progress}`. Commands keep the request's insertion order.

use std::collections::HashSet;

use super::error::{TrackerError, TrackerResult};
use super::model::{BasicFields, Command, UpdateAttribute, UpdateRequest};

/// Output of [`build`]: the two update channels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltUpdate {
    pub basic: BasicFields,
    pub commands: Vec<Command>,
}

impl BuiltUpdate {
    /// Number of calls the executor will make.
    pub fn call_count(&self) -> usize {
        self.commands.len() + usize::from(!self.basic.is_empty())
    }
}

/// Validate a request and split it into basic fields and commands.
///
/// Rejects empty requests and requests that touch the same field twice.
pub fn build(request: &UpdateRequest) -> TrackerResult<BuiltUpdate> {
    if request.is_empty() {
        return Err(TrackerError::validation(
            "Update request does not set any field",
        ));
    }

    let mut seen = HashSet::new();
    let mut built = BuiltUpdate::default();

    for attribute in request.attributes() {
        let field = attribute.field_name();
        if field.trim().is_empty() {
            return Err(TrackerError::validation("Custom field name is empty"));
        }
        if !seen.insert(field_key(field)) {
            return Err(TrackerError::validation(format!(
                "Field '{field}' is set more than once"
            )));
        }

        match attribute {
            UpdateAttribute::Summary(value) => built.basic.summary = Some(value.clone()),
            UpdateAttribute::Description(value) => {
                built.basic.description = Some(value.clone())
            }
            other => built.commands.push(to_command(other)?),
        }
    }

    Ok(built)
}

/// Key two names share when they address the same backend field.
fn field_key(field: &str) -> String {
    let key = field.trim().to_lowercase();
    match key.as_str() {
        "tags" => "tag".to_string(),
        "estimate" => "estimation".to_string(),
        "issue type" | "issue_type" => "type".to_string(),
        _ => key,
    }
}

fn to_command(attribute: &UpdateAttribute) -> TrackerResult<Command> {
    let field = attribute.field_name().to_string();
    let query = match attribute {
        UpdateAttribute::Estimate(minutes) => {
            format!("{field} {}", format_duration(*minutes))
        }
        UpdateAttribute::Tags(tags) => {
            if tags.iter().all(|t| t.trim().is_empty()) {
                return Err(TrackerError::validation("Tag list is empty"));
            }
            tags.iter()
                .filter(|t| !t.trim().is_empty())
                .map(|t| format!("tag {}", quote_value(t.trim())))
                .collect::<Vec<_>>()
                .join(" ")
        }
        UpdateAttribute::State(value)
        | UpdateAttribute::Priority(value)
        | UpdateAttribute::Type(value)
        | UpdateAttribute::Assignee(value)
        | UpdateAttribute::Custom { value, .. } => {
            if value.trim().is_empty() {
                return Err(TrackerError::validation(format!(
                    "Value for field '{field}' is empty"
                )));
            }
            format!("{} {}", quote_value(&field), quote_value(value.trim()))
        }
        UpdateAttribute::Summary(_) | UpdateAttribute::Description(_) => {
            return Err(TrackerError::validation(format!(
                "Field '{field}' cannot be set through a command"
            )));
        }
    };

    Ok(Command {
        field,
        query,
        constrained: attribute.is_constrained(),
    })
}

/// Wrap multi-word names and values in braces, as the command grammar requires.
fn quote_value(value: &str) -> String {
    if value.chars().any(char::is_whitespace) {
        format!("{{{value}}}")
    } else {
        value.to_string()
    }
}

/// Render minutes in the tracker's period grammar.
///
/// Zero components are dropped; zero itself renders as `0m` so that clearing an
/// estimate is never confused with leaving it alone.
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

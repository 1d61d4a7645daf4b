//! Field discovery: legal values of a project's custom field.

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::client::TrackerApi;
use super::model::{FieldLookup, FieldValue, FieldValueSet};

#[derive(Debug, Deserialize)]
struct ProjectCustomField {
    field: Option<FieldDescriptor>,
    #[serde(default)]
    bundle: Option<Bundle>,
}

#[derive(Debug, Deserialize)]
struct FieldDescriptor {
    name: String,
    #[serde(default, rename = "localizedName")]
    localized_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Bundle {
    #[serde(default)]
    values: Vec<BundleValue>,
}

#[derive(Debug, Deserialize)]
struct BundleValue {
    name: String,
    #[serde(default, rename = "localizedName")]
    localized_name: Option<String>,
    #[serde(default)]
    ordinal: Option<i64>,
    #[serde(default, rename = "isResolved")]
    is_resolved: Option<bool>,
    #[serde(default)]
    archived: bool,
}

/// Fetch the legal values of `field` in `project`.
///
/// Never fails: an inaccessible project, an unknown field or a field without
/// an enumerated bundle all come back as [`FieldLookup::Unavailable`].
#[instrument(skip(api))]
pub async fn list_values(api: &dyn TrackerApi, project: &str, field: &str) -> FieldLookup {
    let raw = match api.project_custom_fields(project).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Field discovery failed for {}/{}: {}", project, field, e);
            return FieldLookup::unavailable(format!("project '{project}' is not accessible: {e}"));
        }
    };

    let fields: Vec<ProjectCustomField> = match serde_json::from_value(raw) {
        Ok(fields) => fields,
        Err(e) => {
            warn!("Unexpected field configuration for {}: {}", project, e);
            return FieldLookup::unavailable(format!("unexpected field configuration: {e}"));
        }
    };

    match select_values(fields, project, field) {
        Some(set) => {
            debug!("Found {} value(s) for {}/{}", set.values.len(), project, field);
            FieldLookup::Found(set)
        }
        None => FieldLookup::unavailable(format!(
            "field '{field}' has no enumerated values in project '{project}'"
        )),
    }
}

fn select_values(
    fields: Vec<ProjectCustomField>,
    project: &str,
    field: &str,
) -> Option<FieldValueSet> {
    let matched = fields.into_iter().find(|f| {
        f.field.as_ref().is_some_and(|d| {
            d.name.eq_ignore_ascii_case(field)
                || d.localized_name
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case(field))
        })
    })?;

    let name = matched.field.map(|d| d.name)?;
    let mut values: Vec<FieldValue> = matched
        .bundle?
        .values
        .into_iter()
        .filter(|v| !v.archived)
        .enumerate()
        .map(|(position, v)| FieldValue {
            name: v.name,
            localized_name: v.localized_name,
            ordinal: v.ordinal.unwrap_or(position as i64),
            is_terminal: v.is_resolved,
        })
        .collect();

    if values.is_empty() {
        return None;
    }

    // Stable: equal ordinals keep the tracker's listing order.
    values.sort_by_key(|v| v.ordinal);

    Some(FieldValueSet {
        project: project.to_string(),
        field: name,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tracker::mock::MockTracker;
    use serde_json::json;

    fn priority_config() -> serde_json::Value {
        json!([
            {
                "field": { "name": "Priority" },
                "bundle": { "values": [
                    { "name": "High", "ordinal": 2 },
                    { "name": "Low", "ordinal": 0 },
                    { "name": "Normal", "ordinal": 1 },
                    { "name": "Legacy", "ordinal": 3, "archived": true }
                ]}
            },
            {
                "field": { "name": "State", "localizedName": "Status" },
                "bundle": { "values": [
                    { "name": "Open", "localizedName": "Offen", "ordinal": 0, "isResolved": false },
                    { "name": "Fixed", "ordinal": 5, "isResolved": true },
                    { "name": "In Progress", "ordinal": 1, "isResolved": false }
                ]}
            },
            { "field": { "name": "Spent time" } }
        ])
    }

    #[tokio::test]
    async fn test_values_sorted_by_ordinal_not_name() {
        let api = MockTracker::new().with_project_fields("DEMO", priority_config());
        let lookup = list_values(&api, "DEMO", "Priority").await;

        let set = lookup.values().expect("values");
        assert_eq!(set.display_names(), vec!["Low", "Normal", "High"]);
    }

    #[tokio::test]
    async fn test_localized_names_and_terminal_flags() {
        let api = MockTracker::new().with_project_fields("DEMO", priority_config());
        let lookup = list_values(&api, "DEMO", "status").await;

        let set = lookup.values().expect("values");
        assert_eq!(set.field, "State");
        assert_eq!(set.display_names(), vec!["Offen", "In Progress", "Fixed"]);
        assert_eq!(set.values[2].is_terminal, Some(true));
    }

    #[test]
    fn test_unknown_field_is_unavailable() {
        let api = MockTracker::new().with_project_fields("DEMO", priority_config());
        assert!(matches!(
            tokio_test::block_on(list_values(&api, "DEMO", "Severity")),
            FieldLookup::Unavailable(_)
        ));
        assert!(matches!(
            tokio_test::block_on(list_values(&api, "DEMO", "Spent time")),
            FieldLookup::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_inaccessible_project_is_unavailable() {
        let api = MockTracker::new();
        let lookup = list_values(&api, "NOPE", "Priority").await;
        match lookup {
            FieldLookup::Unavailable(reason) => assert!(reason.contains("NOPE")),
            other => panic!("expected unavailable, got {other:?}"),
        }
    }
}

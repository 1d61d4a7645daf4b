//! Data model for issue field updates.
//!
//! An [`UpdateRequest`] is an ordered list of [`UpdateAttribute`]s. It is turned
//! into [`BasicFields`] plus a list of [`Command`]s, each attempt of which yields
//! one [`CommandOutcome`]. The outcomes are folded into an [`UpdateResult`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::error::{TrackerError, TrackerResult};

// ============================================================================
// Issue references
// ============================================================================

/// A validated issue identifier with its (optional) project context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    id: String,
    project: Option<String>,
    readable: bool,
}

impl IssueRef {
    /// Parse an issue identifier.
    ///
    /// Accepts readable ids (`PROJ-123`) and internal database ids (`2-15`).
    /// The project short name is taken from the readable prefix.
    pub fn parse(id: &str) -> TrackerResult<Self> {
        let id = id.trim();
        let (prefix, number) = id
            .rsplit_once('-')
            .ok_or_else(|| TrackerError::validation(format!("Malformed issue id: '{id}'")))?;

        let number_ok = !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
        if !number_ok || !is_short_name(prefix) {
            return Err(TrackerError::validation(format!(
                "Malformed issue id: '{id}'"
            )));
        }

        let readable = prefix.starts_with(|c: char| c.is_ascii_alphabetic());
        Ok(Self {
            id: id.to_string(),
            project: readable.then(|| prefix.to_string()),
            readable,
        })
    }

    /// Override the project context (e.g. for internal ids).
    ///
    /// A blank override keeps the current context.
    pub fn with_project(mut self, project: &str) -> TrackerResult<Self> {
        if !project.trim().is_empty() {
            self.project = Some(validate_project(project)?.to_string());
        }
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Whether the id is a readable (`PROJ-123`) id rather than an internal one.
    pub fn is_readable(&self) -> bool {
        self.readable
    }
}

fn is_short_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check a project short name (`PROJ`, `MY_APP`) before it is used in a path.
pub fn validate_project(project: &str) -> TrackerResult<&str> {
    let project = project.trim();
    if is_short_name(project) {
        Ok(project)
    } else {
        Err(TrackerError::validation(format!(
            "Malformed project short name: '{project}'"
        )))
    }
}

// ============================================================================
// Update request
// ============================================================================

/// One mutable attribute of an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAttribute {
    Summary(String),
    Description(String),
    State(String),
    Priority(String),
    Type(String),
    Assignee(String),
    /// Estimate in minutes.
    Estimate(u32),
    Tags(Vec<String>),
    Custom { name: String, value: String },
}

impl UpdateAttribute {
    /// Backend field name this attribute mutates.
    pub fn field_name(&self) -> &str {
        match self {
            Self::Summary(_) => "summary",
            Self::Description(_) => "description",
            Self::State(_) => "State",
            Self::Priority(_) => "Priority",
            Self::Type(_) => "Type",
            Self::Assignee(_) => "Assignee",
            Self::Estimate(_) => "Estimation",
            Self::Tags(_) => "tag",
            Self::Custom { name, .. } => name,
        }
    }

    /// Whether this attribute goes through the direct replace call instead of a command.
    pub fn is_basic(&self) -> bool {
        matches!(self, Self::Summary(_) | Self::Description(_))
    }

    /// Whether the attribute's legal values are a project-configured enumeration.
    pub fn is_constrained(&self) -> bool {
        matches!(self, Self::State(_) | Self::Priority(_) | Self::Type(_))
    }
}

/// Caller intent: a sparse, ordered set of attributes to change.
///
/// Attributes are applied in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRequest {
    attributes: Vec<UpdateAttribute>,
}

impl UpdateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute.
    pub fn push(&mut self, attribute: UpdateAttribute) {
        self.attributes.push(attribute);
    }

    pub fn with(mut self, attribute: UpdateAttribute) -> Self {
        self.push(attribute);
        self
    }

    pub fn summary(self, value: impl Into<String>) -> Self {
        self.with(UpdateAttribute::Summary(value.into()))
    }

    pub fn description(self, value: impl Into<String>) -> Self {
        self.with(UpdateAttribute::Description(value.into()))
    }

    pub fn state(self, value: impl Into<String>) -> Self {
        self.with(UpdateAttribute::State(value.into()))
    }

    pub fn priority(self, value: impl Into<String>) -> Self {
        self.with(UpdateAttribute::Priority(value.into()))
    }

    pub fn issue_type(self, value: impl Into<String>) -> Self {
        self.with(UpdateAttribute::Type(value.into()))
    }

    pub fn assignee(self, value: impl Into<String>) -> Self {
        self.with(UpdateAttribute::Assignee(value.into()))
    }

    pub fn estimate_minutes(self, minutes: u32) -> Self {
        self.with(UpdateAttribute::Estimate(minutes))
    }

    pub fn tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(UpdateAttribute::Tags(tags.into_iter().map(Into::into).collect()))
    }

    pub fn custom(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(UpdateAttribute::Custom {
            name: name.into(),
            value: value.into(),
        })
    }

    pub fn attributes(&self) -> &[UpdateAttribute] {
        &self.attributes
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

// ============================================================================
// Commands and outcomes
// ============================================================================

/// Text fields replaced through a single direct call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BasicFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BasicFields {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.description.is_none()
    }

    /// Human-readable label used where a command string would go.
    pub fn describe(&self) -> String {
        let mut names = Vec::new();
        if self.summary.is_some() {
            names.push("summary");
        }
        if self.description.is_some() {
            names.push("description");
        }
        format!("update {}", names.join(", "))
    }
}

/// A single atomic mutation in the tracker's command grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub field: String,
    pub query: String,
    pub constrained: bool,
}

/// Why an attempted command failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    pub message: String,
    /// The backend refused the value itself (as opposed to transport/permission trouble).
    pub value_rejected: bool,
}

impl From<&TrackerError> for CommandFailure {
    fn from(err: &TrackerError) -> Self {
        Self {
            message: err.to_string(),
            value_rejected: err.is_value_rejection(),
        }
    }
}

/// Result of attempting one command. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub field: String,
    pub command: String,
    pub constrained: bool,
    pub failure: Option<CommandFailure>,
}

impl CommandOutcome {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

// ============================================================================
// Field values
// ============================================================================

/// One legal value of a constrained field.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct FieldValue {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localized_name: Option<String>,
    pub ordinal: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_terminal: Option<bool>,
}

impl FieldValue {
    /// Name shown to users: the localized name when the tracker provides one.
    pub fn display_name(&self) -> &str {
        self.localized_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name)
    }
}

/// Legal values of one field in one project, in the project's declared order.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct FieldValueSet {
    pub project: String,
    pub field: String,
    pub values: Vec<FieldValue>,
}

impl FieldValueSet {
    pub fn display_names(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|v| v.display_name().to_string())
            .collect()
    }
}

/// Outcome of a field value lookup. Lookups never fail outright.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldLookup {
    Found(FieldValueSet),
    Unavailable(String),
}

impl FieldLookup {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    pub fn values(&self) -> Option<&FieldValueSet> {
        match self {
            Self::Found(set) => Some(set),
            Self::Unavailable(_) => None,
        }
    }
}

// ============================================================================
// Update result
// ============================================================================

/// Overall status of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    /// Every attempted change was applied.
    Success,
    /// Some changes were applied, some were not.
    PartialSuccess,
    /// Nothing was applied.
    Failure,
    /// Nothing was attempted.
    NoOp,
}

impl UpdateStatus {
    pub fn from_counts(attempted: usize, succeeded: usize) -> Self {
        match (attempted, succeeded) {
            (0, _) => Self::NoOp,
            (a, s) if s == a => Self::Success,
            (_, 0) => Self::Failure,
            _ => Self::PartialSuccess,
        }
    }
}

/// Explanation of one failed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Diagnostic {
    pub command: String,
    pub error: String,
    /// Legal values for the rejected field, in project order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hint: Vec<String>,
}

/// Aggregated view of all command outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub status: UpdateStatus,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// A custom field as read back from the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SnapshotField {
    pub name: String,
    pub value: Option<String>,
}

/// Authoritative issue state as read back from the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct IssueSnapshot {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<SnapshotField>,
    pub tags: Vec<String>,
}

impl IssueSnapshot {
    /// Look up a custom field's rendered value by (case-insensitive) name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .and_then(|f| f.value.as_deref())
    }
}

/// Terminal artifact of an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct UpdateResult {
    pub issue_id: String,
    pub status: UpdateStatus,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// `None` means the outcome of each command is known but the final state is not.
    pub snapshot: Option<IssueSnapshot>,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

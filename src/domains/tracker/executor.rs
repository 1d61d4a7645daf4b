//! Command executor: applies each command on its own.
//!
//! One invalid value (say, a `Bug` type in a project that only knows `Task`)
//! must not stop the other changes, so commands are never batched and a
//! failure is recorded instead of returned.

use tracing::{debug, instrument, warn};

use super::client::TrackerApi;
use super::commands::BuiltUpdate;
use super::model::{CommandFailure, CommandOutcome, IssueRef};

/// Field name recorded for the direct summary/description call.
pub const BASIC_FIELDS: &str = "basic fields";

/// Apply the basic-fields call (if any) and then every command, in order.
///
/// Always returns one outcome per call made; never short-circuits.
#[instrument(skip_all, fields(issue = %issue.id(), calls = update.call_count()))]
pub async fn execute_all(
    api: &dyn TrackerApi,
    issue: &IssueRef,
    update: &BuiltUpdate,
) -> Vec<CommandOutcome> {
    let mut outcomes = Vec::with_capacity(update.call_count());

    if !update.basic.is_empty() {
        let result = api.update_basic_fields(issue, &update.basic).await;
        outcomes.push(CommandOutcome {
            field: BASIC_FIELDS.to_string(),
            command: update.basic.describe(),
            constrained: false,
            failure: result.as_ref().err().map(CommandFailure::from),
        });
        if let Err(e) = result {
            warn!("Basic field update failed: {}", e);
        }
    }

    for command in &update.commands {
        let result = api.apply_command(issue, &command.query).await;
        match &result {
            Ok(()) => debug!("Applied '{}'", command.query),
            Err(e) => warn!("Command '{}' failed: {}", command.query, e),
        }
        outcomes.push(CommandOutcome {
            field: command.field.clone(),
            command: command.query.clone(),
            constrained: command.constrained,
            failure: result.as_ref().err().map(CommandFailure::from),
        });
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tracker::commands::build;
    use crate::domains::tracker::mock::MockTracker;
    use crate::domains::tracker::model::UpdateRequest;

    #[tokio::test]
    async fn test_failure_does_not_abort_siblings() {
        let api = MockTracker::new()
            .with_issue("DEMO-1")
            .with_enum_field("DEMO", "Type", &["Task", "Defect"]);
        let issue = IssueRef::parse("DEMO-1").unwrap();
        let update = build(
            &UpdateRequest::new()
                .summary("Renamed")
                .issue_type("Bug")
                .assignee("jane"),
        )
        .unwrap();

        let outcomes = execute_all(&api, &issue, &update).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].field, BASIC_FIELDS);
        assert!(outcomes[0].succeeded());
        assert!(!outcomes[1].succeeded());
        assert!(outcomes[1].failure.as_ref().unwrap().value_rejected);
        assert!(outcomes[2].succeeded());
        assert_eq!(api.command_calls(), 2);
        assert_eq!(api.basic_calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_recorded_not_raised() {
        let api = MockTracker::new()
            .with_issue("DEMO-1")
            .fail_commands_with(503, "Service Unavailable");
        let issue = IssueRef::parse("DEMO-1").unwrap();
        let update = build(&UpdateRequest::new().state("Open").priority("High")).unwrap();

        let outcomes = execute_all(&api, &issue, &update).await;

        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            let failure = outcome.failure.as_ref().unwrap();
            assert!(!failure.value_rejected);
            assert!(failure.message.contains("503"));
        }
    }
}

//! Result aggregator: folds command outcomes into counts and diagnostics.
//!
//! Each failed command produces exactly one [`Diagnostic`], in the order the
//! commands were attempted. When the backend rejected the value of a
//! constrained field, the diagnostic also lists the field's legal values.

use std::collections::HashMap;

use tracing::{debug, instrument};

use super::client::TrackerApi;
use super::discovery::list_values;
use super::model::{Aggregation, CommandOutcome, Diagnostic, FieldLookup, UpdateStatus};

/// Classify the outcomes and explain every failure.
#[instrument(skip_all, fields(outcomes = outcomes.len(), project = ?project))]
pub async fn aggregate(
    api: &dyn TrackerApi,
    outcomes: &[CommandOutcome],
    project: Option<&str>,
) -> Aggregation {
    let attempted = outcomes.len();
    let succeeded = outcomes.iter().filter(|o| o.succeeded()).count();

    // Lookups live only for this call.
    let mut lookups: HashMap<String, FieldLookup> = HashMap::new();
    let mut diagnostics = Vec::new();

    for outcome in outcomes {
        let Some(failure) = &outcome.failure else {
            continue;
        };

        let mut hint = Vec::new();
        if outcome.constrained && failure.value_rejected {
            if let Some(project) = project {
                let key = outcome.field.to_lowercase();
                if !lookups.contains_key(&key) {
                    let lookup = list_values(api, project, &outcome.field).await;
                    lookups.insert(key.clone(), lookup);
                }
                match lookups.get(&key) {
                    Some(FieldLookup::Found(set)) => hint = set.display_names(),
                    Some(FieldLookup::Unavailable(reason)) => {
                        debug!("No hint for '{}': {}", outcome.command, reason)
                    }
                    None => {}
                }
            }
        }

        diagnostics.push(Diagnostic {
            command: outcome.command.clone(),
            error: failure.message.clone(),
            hint,
        });
    }

    Aggregation {
        status: UpdateStatus::from_counts(attempted, succeeded),
        attempted,
        succeeded,
        failed: attempted - succeeded,
        diagnostics,
    }
}

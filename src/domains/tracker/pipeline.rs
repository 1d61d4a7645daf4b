//! Issue update pipeline.
//!
//! `build -> execute -> aggregate -> refresh`. Only a malformed issue id or an
//! empty/contradictory request is returned as an error, and both are caught
//! before any network call. Everything after that ends in an [`UpdateResult`]:
//! there is no rollback, only an accurate report of what was applied.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::aggregator::aggregate;
use super::client::TrackerApi;
use super::commands::build;
use super::error::TrackerResult;
use super::executor::execute_all;
use super::model::{IssueRef, UpdateRequest, UpdateResult, UpdateStatus};
use super::refresh::refresh;

/// Runs field updates against one tracker.
///
/// Holds no per-update state, so concurrent updates of different issues can
/// share one pipeline.
#[derive(Clone)]
pub struct UpdatePipeline {
    api: Arc<dyn TrackerApi>,
}

impl UpdatePipeline {
    pub fn new(api: Arc<dyn TrackerApi>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &Arc<dyn TrackerApi> {
        &self.api
    }

    /// Apply `request` to `issue` and report what happened.
    #[instrument(skip_all, fields(issue = %issue.id()))]
    pub async fn run(&self, issue: &IssueRef, request: &UpdateRequest) -> TrackerResult<UpdateResult> {
        let update = build(request)?;
        info!(
            "Updating {} with {} call(s)",
            issue.id(),
            update.call_count()
        );

        let outcomes = execute_all(self.api.as_ref(), issue, &update).await;
        let aggregation = aggregate(self.api.as_ref(), &outcomes, issue.project()).await;

        let mut warnings = Vec::new();
        let snapshot = match refresh(self.api.as_ref(), issue).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Issue {} updated but could not be re-read: {}", issue.id(), e);
                warnings.push(format!(
                    "Final state of {} is unknown, re-read failed: {}",
                    issue.id(),
                    e
                ));
                None
            }
        };

        match aggregation.status {
            UpdateStatus::Success | UpdateStatus::NoOp => {
                info!("Updated {}: {} change(s) applied", issue.id(), aggregation.succeeded)
            }
            _ => warn!(
                "Updated {} partially: {}/{} change(s) applied",
                issue.id(),
                aggregation.succeeded,
                aggregation.attempted
            ),
        }

        Ok(UpdateResult {
            issue_id: issue.id().to_string(),
            status: aggregation.status,
            attempted: aggregation.attempted,
            succeeded: aggregation.succeeded,
            failed: aggregation.failed,
            snapshot,
            diagnostics: aggregation.diagnostics,
            warnings,
        })
    }
}

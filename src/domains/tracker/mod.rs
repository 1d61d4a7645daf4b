//! Tracker domain module.
//!
//! This module turns structured "update these fields" requests into tracker
//! commands and reports exactly which of them were applied.
//!
//! ## Architecture
//!
//! - `client.rs` - `TrackerApi` seam and the YouTrack REST client
//! - `model.rs` - Requests, commands, outcomes and results
//! - `commands.rs` - Command builder (request -> basic fields + commands)
//! - `executor.rs` - Applies commands one at a time, isolating failures
//! - `aggregator.rs` - Counts outcomes and explains failures
//! - `discovery.rs` - Legal values of a project field
//! - `refresh.rs` - Reads the issue back after mutation
//! - `pipeline.rs` - Runs the stages above in order

pub mod aggregator;
pub mod client;
pub mod commands;
pub mod discovery;
mod error;
pub mod executor;
pub mod model;
pub mod pipeline;
pub mod refresh;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{TrackerApi, YouTrackClient};
pub use error::{TrackerError, TrackerResult};
pub use model::{
    Diagnostic, FieldLookup, FieldValue, FieldValueSet, IssueRef, IssueSnapshot, UpdateAttribute,
    UpdateRequest, UpdateResult, UpdateStatus,
};
pub use pipeline::UpdatePipeline;

//! Issue tools module.
//!
//! - `update`: apply field changes and report per-change outcomes
//! - `get`: read an issue's current state
//! - `field_values`: list the legal values of an enumerated field
//!
//! All three share one [`UpdatePipeline`](crate::domains::tracker::UpdatePipeline).

pub mod common;
pub mod field_values;
pub mod get;
pub mod update;

pub use field_values::{GetFieldValuesParams, GetFieldValuesTool};
pub use get::{GetIssueParams, GetIssueTool};
pub use update::{CustomFieldParam, UpdateIssueParams, UpdateIssueTool};

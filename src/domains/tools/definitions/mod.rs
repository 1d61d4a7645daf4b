//! Tool definitions module.
//!
//! Each tool is defined in its own file, grouped by the area it serves.

pub mod issues;

pub use issues::{
    CustomFieldParam, GetFieldValuesParams, GetFieldValuesTool, GetIssueParams, GetIssueTool,
    UpdateIssueParams, UpdateIssueTool,
};

//! Error types and handling for the MCP server.
//!
//! Startup failures surface through [`Error`]; tool calls report their own
//! failures inside the tool result instead.

use thiserror::Error;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the tracker domain.
    #[error("Tracker error: {0}")]
    Tracker(#[from] crate::domains::tracker::TrackerError),
}

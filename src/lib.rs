//! YouTrack MCP Server Library
//!
//! A Model Context Protocol (MCP) server that lets clients read and update
//! YouTrack issues. Updates are applied one field at a time so that one
//! rejected value does not block the others, and every update reports
//! exactly which changes were applied.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the MCP server and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **tracker**: command building, execution, aggregation, field
//!     discovery and state refresh
//!   - **tools**: the MCP tools built on top of the tracker pipeline
//!
//! # Example
//!
//! ```rust,no_run
//! use youtrack_mcp_server::domains::tracker::{IssueRef, UpdateRequest};
//! use youtrack_mcp_server::{Config, McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config)?;
//!     // Start the server with a TransportService...
//!
//!     let request = UpdateRequest::new().state("In Progress").priority("High");
//!     let issue = IssueRef::parse("PROJ-123")?;
//!     let _ = (server, request, issue);
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};

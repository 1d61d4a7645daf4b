//! Tools domain module.
//!
//! Tools are the functions MCP clients call. Here they are thin adapters
//! between JSON arguments and the tracker pipeline.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `router.rs` - ToolRouter builder for the STDIO transport
//! - `registry.rs` - Tool listing and HTTP dispatch
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` with params, `execute()`,
//!    `http_handler()`, `to_tool()` and `create_route()`
//! 2. Export it in `definitions/mod.rs`
//! 3. Add its route in `router.rs`
//! 4. Register it in `registry.rs` for HTTP support

pub mod definitions;
mod error;
mod registry;
pub mod router;

pub use error::ToolError;
pub use registry::ToolRegistry;
pub use router::build_tool_router;

//! Domains module containing business logic organized by bounded contexts.
//!
//! - `tracker`: the field update pipeline and the YouTrack client
//! - `tools`: MCP tool adapters over the tracker domain

pub mod tools;
pub mod tracker;

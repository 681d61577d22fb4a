//! Domains module containing business logic organized by bounded contexts.
//!
//! - **advisory**: region validation, layer fetching and recommendation merging
//! - **tools**: MCP tools exposing the advisory operations to clients
//! - **resources**: read-only reference data (region bounds, layer catalogs)

pub mod advisory;
pub mod resources;
pub mod tools;

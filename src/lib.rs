//! Fertilizer Advisory MCP Server Library
//!
//! A Model Context Protocol (MCP) server that returns fertilizer and expected
//! yield recommendations for wheat and maize at a location, aggregated from
//! five independent layers of a remote advisory service.
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling, the MCP server handler and transports
//! - **domains**: Business logic organized by bounded contexts
//!   - **advisory**: Region validation, layer fetching and recommendation merging
//!   - **tools**: MCP tools exposing the advisory operations
//!   - **resources**: Read-only reference data for clients
//!
//! # Example
//!
//! ```rust,no_run
//! use fertilizer_advisory_mcp_server::domains::advisory::{Coordinate, Crop};
//! use fertilizer_advisory_mcp_server::{Config, RecommendationAggregator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let aggregator = RecommendationAggregator::from_config(&config.advisory)?;
//!     let recommendation = aggregator
//!         .recommend(Crop::Wheat, Coordinate::new(9.145, 38.7617))
//!         .await?;
//!     println!("{:?}", recommendation.inorganic.urea);
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
pub use domains::advisory::{AdvisoryError, Recommendation, RecommendationAggregator};

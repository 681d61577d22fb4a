//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools
//! - HTTP dispatch for tool calls (when http feature is enabled)
//! - Tool metadata for listing

use std::sync::Arc;
#[cfg(feature = "http")]
use tracing::warn;

use rmcp::model::Tool;

use crate::core::config::Config;
use crate::domains::advisory::RecommendationAggregator;

#[cfg(feature = "http")]
use super::ToolError;
use super::definitions::{
    CheckSupportedRegionTool, FertilizerRecommendationTool, ListCropLayersTool,
};

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
///
/// This struct provides a central point for:
/// - Listing all available tools
/// - Dispatching HTTP tool calls (when http feature is enabled)
pub struct ToolRegistry {
    #[cfg_attr(not(feature = "http"), allow(dead_code))]
    config: Arc<Config>,
    #[cfg_attr(not(feature = "http"), allow(dead_code))]
    aggregator: Arc<RecommendationAggregator>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new(config: Arc<Config>, aggregator: Arc<RecommendationAggregator>) -> Self {
        Self { config, aggregator }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![
            FertilizerRecommendationTool::NAME,
            CheckSupportedRegionTool::NAME,
            ListCropLayersTool::NAME,
        ]
    }

    /// Get all tools as Tool models (metadata).
    ///
    /// Both HTTP and STDIO/TCP transports use this to get tool metadata.
    pub fn get_all_tools() -> Vec<Tool> {
        vec![
            FertilizerRecommendationTool::to_tool(),
            CheckSupportedRegionTool::to_tool(),
            ListCropLayersTool::to_tool(),
        ]
    }

    /// Dispatch an HTTP tool call to the appropriate handler.
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        match name {
            FertilizerRecommendationTool::NAME => FertilizerRecommendationTool::http_handler(
                arguments,
                self.config.clone(),
                self.aggregator.clone(),
            )
            .await
            .map_err(ToolError::invalid_arguments),
            CheckSupportedRegionTool::NAME => CheckSupportedRegionTool::http_handler(arguments)
                .map_err(ToolError::invalid_arguments),
            ListCropLayersTool::NAME => {
                ListCropLayersTool::http_handler(arguments, self.aggregator.clone())
                    .map_err(ToolError::invalid_arguments)
            }
            _ => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolError::not_found(name))
            }
        }
    }
}

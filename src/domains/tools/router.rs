//! Tool Router - builds the rmcp ToolRouter from the tool definitions.
//!
//! This module builds the ToolRouter for STDIO/TCP transport by delegating
//! to the tool definitions themselves. Each tool knows how to create its own route.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use crate::core::config::Config;
use crate::domains::advisory::RecommendationAggregator;

use super::definitions::{
    CheckSupportedRegionTool, FertilizerRecommendationTool, ListCropLayersTool,
};

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(
    config: Arc<Config>,
    aggregator: Arc<RecommendationAggregator>,
) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(FertilizerRecommendationTool::create_route(
            config,
            aggregator.clone(),
        ))
        .with_route(CheckSupportedRegionTool::create_route())
        .with_route(ListCropLayersTool::create_route(aggregator))
}

//! Fertilizer recommendation tool definition.
//!
//! Runs the five-layer recommendation pipeline for a crop at a location and
//! returns the merged organic, inorganic and yield figures.

use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};

use futures::FutureExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::core::config::Config;
use crate::domains::advisory::{
    AdvisoryError, Category, Coordinate, Crop, Recommendation, RecommendationAggregator,
    RegionBounds,
};
use crate::domains::tools::definitions::common::{
    error_result, format_amount, structured_error, structured_result,
};

/// Message returned when no layer yielded a usable value.
pub const INSUFFICIENT_DATA_MESSAGE: &str =
    "Unable to generate recommendations for this location at this time. Please try again later.";

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the fertilizer recommendation tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FertilizerRecommendationParams {
    /// Crop to advise on ("wheat" or "maize").
    pub crop: Crop,

    /// Latitude in decimal degrees. Falls back to the configured default location.
    #[serde(default)]
    pub latitude: Option<f64>,

    /// Longitude in decimal degrees. Falls back to the configured default location.
    #[serde(default)]
    pub longitude: Option<f64>,
}

// ============================================================================
// Structured Output Types
// ============================================================================

/// Structured details for a location outside the supported region.
#[derive(Debug, Clone, Serialize)]
pub struct RegionRejection {
    pub error: &'static str,
    pub message: String,
    pub location: Coordinate,
    pub bounds: RegionBounds,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Fertilizer recommendation tool.
pub struct FertilizerRecommendationTool;

impl FertilizerRecommendationTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "fertilizer_recommendation";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Get fertilizer and expected yield recommendations for wheat or maize at a location. Returns organic rates (compost, vermicompost in tons/ha), inorganic rates (urea, NPS in kg/ha) and expected yield (kg/ha). Only locations between latitude 3-15 and longitude 32-48 are supported.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(crop = %params.crop))]
    pub async fn execute(
        params: &FertilizerRecommendationParams,
        aggregator: &RecommendationAggregator,
        config: &Config,
    ) -> CallToolResult {
        let location = match resolve_location(params, config) {
            Ok(location) => location,
            Err(message) => return error_result(&message),
        };

        info!("Recommendation requested for {} at {}", params.crop, location);

        match aggregator.recommend(params.crop, location).await {
            Ok(recommendation) => {
                let summary = summarize(&recommendation);
                structured_result(summary, recommendation)
            }
            Err(error) => match &error {
                AdvisoryError::UnsupportedRegion { coordinate, bounds } => {
                    let message = error.to_string();
                    let rejection = RegionRejection {
                        error: "unsupported_region",
                        message: message.clone(),
                        location: *coordinate,
                        bounds: *bounds,
                    };
                    structured_error(message, rejection)
                }
                // Layer diagnostics stay in the logs.
                AdvisoryError::InsufficientData { .. } => error_result(INSUFFICIENT_DATA_MESSAGE),
            },
        }
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        config: Arc<Config>,
        aggregator: Arc<RecommendationAggregator>,
    ) -> Result<serde_json::Value, String> {
        let params: FertilizerRecommendationParams = serde_json::from_value(arguments)
            .map_err(|e| format!("Invalid parameters: {}", e))?;

        let result = Self::execute(&params, &aggregator, &config).await;
        Ok(super::super::common::to_http_response(result))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<FertilizerRecommendationParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for STDIO/TCP transport.
    pub fn create_route<S>(
        config: Arc<Config>,
        aggregator: Arc<RecommendationAggregator>,
    ) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let config = config.clone();
            let aggregator = aggregator.clone();
            async move {
                let params: FertilizerRecommendationParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(Self::execute(&params, &aggregator, &config).await)
            }
            .boxed()
        })
    }
}

/// Pick the request coordinate, falling back to the configured default.
fn resolve_location(
    params: &FertilizerRecommendationParams,
    config: &Config,
) -> Result<Coordinate, String> {
    let location = match (params.latitude, params.longitude) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon),
        (None, None) => config.advisory.default_location.ok_or_else(|| {
            "latitude and longitude are required (no default location is configured)".to_string()
        })?,
        _ => return Err("latitude and longitude must be provided together".to_string()),
    };

    if !location.is_on_globe() {
        return Err(format!("Invalid coordinate {}", location));
    }

    Ok(location)
}

fn summarize(recommendation: &Recommendation) -> String {
    let figures: Vec<String> = Category::ALL
        .iter()
        .map(|category| match recommendation.get(*category) {
            Some(value) => format!(
                "{} {} {}",
                category.as_str(),
                format_amount(value),
                category.unit()
            ),
            None => format!("{} unavailable", category.as_str()),
        })
        .collect();

    format!(
        "{} at {}: {} (source: {})",
        recommendation.crop,
        recommendation.location,
        figures.join(", "),
        recommendation.data_source
    )
}

// ============================================================================
// Tests
// ============================================================================

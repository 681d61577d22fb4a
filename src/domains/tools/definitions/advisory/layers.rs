//! Crop layer listing tool definition.

use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};

use futures::FutureExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domains::advisory::{Crop, LayerCatalog, LayerSpec, RecommendationAggregator};
use crate::domains::tools::definitions::common::structured_result;

/// Parameters for the layer listing tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListCropLayersParams {
    /// Crop whose layers to list ("wheat" or "maize").
    pub crop: Crop,
}

/// Structured output: the layers queried for one crop.
#[derive(Debug, Clone, Serialize)]
pub struct CropLayers {
    pub crop: Crop,
    pub layers: Vec<LayerSpec>,
}

/// Layer listing tool.
pub struct ListCropLayersTool;

impl ListCropLayersTool {
    pub const NAME: &'static str = "list_crop_layers";

    pub const DESCRIPTION: &'static str = "List the upstream data layers (layer id, query date, unit) consulted when building a recommendation for a crop.";

    pub fn execute(params: &ListCropLayersParams, catalog: &LayerCatalog) -> CallToolResult {
        let layers = catalog.specs(params.crop);
        let summary = format!(
            "{} layers for {}: {}",
            layers.len(),
            params.crop,
            layers
                .iter()
                .map(|spec| format!("{} ({})", spec.layer_id, spec.date))
                .collect::<Vec<_>>()
                .join(", ")
        );

        structured_result(
            summary,
            CropLayers {
                crop: params.crop,
                layers,
            },
        )
    }

    #[cfg(feature = "http")]
    pub fn http_handler(
        arguments: serde_json::Value,
        aggregator: Arc<RecommendationAggregator>,
    ) -> Result<serde_json::Value, String> {
        let params: ListCropLayersParams = serde_json::from_value(arguments)
            .map_err(|e| format!("Invalid parameters: {}", e))?;
        let result = Self::execute(&params, aggregator.catalog());
        Ok(super::super::common::to_http_response(result))
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<ListCropLayersParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    pub fn create_route<S>(aggregator: Arc<RecommendationAggregator>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let aggregator = aggregator.clone();
            async move {
                let params: ListCropLayersParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(Self::execute(&params, aggregator.catalog()))
            }
            .boxed()
        })
    }
}

//! Region check tool definition.
//!
//! Tells a client whether a coordinate falls inside the area the advisory
//! service covers, without contacting the service.

use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};

use futures::FutureExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domains::advisory::{Coordinate, RegionBounds, SUPPORTED_REGION, is_supported};
use crate::domains::tools::definitions::common::{error_result, structured_result};

/// Parameters for the region check tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CheckSupportedRegionParams {
    /// Latitude in decimal degrees.
    pub latitude: f64,

    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Structured output for a region check.
#[derive(Debug, Clone, Serialize)]
pub struct RegionCheck {
    pub supported: bool,
    pub location: Coordinate,
    pub bounds: RegionBounds,
}

/// Region check tool.
pub struct CheckSupportedRegionTool;

impl CheckSupportedRegionTool {
    pub const NAME: &'static str = "check_supported_region";

    pub const DESCRIPTION: &'static str = "Check whether a latitude/longitude lies inside the region covered by fertilizer recommendations (latitude 3-15, longitude 32-48, inclusive).";

    pub fn execute(params: &CheckSupportedRegionParams) -> CallToolResult {
        let location = Coordinate::new(params.latitude, params.longitude);
        if !location.is_on_globe() {
            return error_result(&format!("Invalid coordinate {}", location));
        }

        let supported = is_supported(&location);
        debug!("Region check for {}: {}", location, supported);

        let summary = if supported {
            format!("{} is inside the supported region {}", location, SUPPORTED_REGION)
        } else {
            format!("{} is outside the supported region {}", location, SUPPORTED_REGION)
        };

        structured_result(
            summary,
            RegionCheck {
                supported,
                location,
                bounds: SUPPORTED_REGION,
            },
        )
    }

    #[cfg(feature = "http")]
    pub fn http_handler(arguments: serde_json::Value) -> Result<serde_json::Value, String> {
        let params: CheckSupportedRegionParams = serde_json::from_value(arguments)
            .map_err(|e| format!("Invalid parameters: {}", e))?;
        Ok(super::super::common::to_http_response(Self::execute(&params)))
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<CheckSupportedRegionParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    pub fn create_route<S>() -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            async move {
                let params: CheckSupportedRegionParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(Self::execute(&params))
            }
            .boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(latitude: f64, longitude: f64) -> CallToolResult {
        CheckSupportedRegionTool::execute(&CheckSupportedRegionParams {
            latitude,
            longitude,
        })
    }

    #[test]
    fn test_inside_region() {
        let result = check(9.145, 38.7617);
        assert_eq!(result.is_error, Some(false));
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["supported"], true);
        assert_eq!(structured["bounds"]["minLon"], 32.0);
    }

    #[test]
    fn test_boundary_is_inside() {
        let structured = check(15.0, 32.0).structured_content.unwrap();
        assert_eq!(structured["supported"], true);
    }

    #[test]
    fn test_outside_region() {
        let result = check(20.0, 38.0);
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.structured_content.unwrap()["supported"], false);
    }

    #[test]
    fn test_invalid_coordinate() {
        let result = check(9.0, 200.0);
        assert_eq!(result.is_error, Some(true));
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_handler_missing_param() {
        let result = CheckSupportedRegionTool::http_handler(serde_json::json!({ "latitude": 9.0 }));
        assert!(result.is_err());
    }
}

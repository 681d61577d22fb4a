//! Supported region resource definition.

use super::ResourceDefinition;
use crate::domains::advisory::SUPPORTED_REGION;
use crate::domains::resources::service::ResourceContent;

/// Bounding box of the advisory coverage (static).
pub struct RegionBoundsResource;

impl ResourceDefinition for RegionBoundsResource {
    const URI: &'static str = "advisory://region/bounds";
    const NAME: &'static str = "Supported Region";
    const DESCRIPTION: &'static str =
        "Inclusive latitude/longitude bounding box where recommendations are available";
    const MIME_TYPE: &'static str = "application/json";

    fn content() -> ResourceContent {
        let bounds = serde_json::json!({
            "minLat": SUPPORTED_REGION.min_lat,
            "maxLat": SUPPORTED_REGION.max_lat,
            "minLon": SUPPORTED_REGION.min_lon,
            "maxLon": SUPPORTED_REGION.max_lon,
            "inclusive": true,
        });
        ResourceContent::Text(format!("{:#}", bounds))
    }
}

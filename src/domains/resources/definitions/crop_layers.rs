//! Per-crop layer catalog resource definitions.

use super::ResourceDefinition;
use crate::domains::advisory::Crop;
use crate::domains::resources::service::{DynamicResourceType, ResourceContent};

/// Layers queried for wheat (dynamic, reflects configured dates).
pub struct WheatLayersResource;

impl ResourceDefinition for WheatLayersResource {
    const URI: &'static str = "advisory://layers/wheat";
    const NAME: &'static str = "Wheat Layers";
    const DESCRIPTION: &'static str = "Upstream layers and query dates used for wheat";
    const MIME_TYPE: &'static str = "application/json";

    fn content() -> ResourceContent {
        ResourceContent::Dynamic(DynamicResourceType::CropLayers(Crop::Wheat))
    }
}

/// Layers queried for maize (dynamic, reflects configured dates).
pub struct MaizeLayersResource;

impl ResourceDefinition for MaizeLayersResource {
    const URI: &'static str = "advisory://layers/maize";
    const NAME: &'static str = "Maize Layers";
    const DESCRIPTION: &'static str = "Upstream layers and query dates used for maize";
    const MIME_TYPE: &'static str = "application/json";

    fn content() -> ResourceContent {
        ResourceContent::Dynamic(DynamicResourceType::CropLayers(Crop::Maize))
    }
}

//! Advisory tools module.
//!
//! - `recommend`: Fertilizer and yield recommendation for a crop at a location
//! - `region`: Supported-region check (no network activity)
//! - `layers`: Upstream layers consulted per crop
//!
//! Each tool has handlers for both HTTP and STDIO/TCP transports.

pub mod layers;
pub mod recommend;
pub mod region;

pub use layers::{ListCropLayersParams, ListCropLayersTool};
pub use recommend::{FertilizerRecommendationParams, FertilizerRecommendationTool};
pub use region::{CheckSupportedRegionParams, CheckSupportedRegionTool};

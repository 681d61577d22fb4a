//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod advisory;
pub mod common;

pub use advisory::{
    CheckSupportedRegionParams, CheckSupportedRegionTool, FertilizerRecommendationParams,
    FertilizerRecommendationTool, ListCropLayersParams, ListCropLayersTool,
};

//! Advisory domain module.
//!
//! Location-gated fertilizer and yield recommendations backed by a remote
//! advisory service.
//!
//! ## Architecture
//!
//! - `region.rs` - Coordinates and the supported bounding box
//! - `layers.rs` - Crops, categories and the per-crop layer catalog
//! - `fetcher.rs` - The `LayerFetcher` contract and its HTTP implementation
//! - `aggregator.rs` - Fan-out over the five layers, merge and sufficiency policy

pub mod aggregator;
pub mod fetcher;
pub mod layers;
pub mod region;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::{
    AdvisoryError, DEFAULT_DATA_SOURCE, InorganicRates, LayerFailure, LayerResult, OrganicRates,
    Recommendation, RecommendationAggregator, Units,
};
pub use fetcher::{
    DEFAULT_FETCH_TIMEOUT, FetchError, HttpLayerFetcher, LayerFetcher, LayerPayload, RawValue,
};
pub use layers::{Category, Crop, LayerCatalog, LayerSpec};
pub use region::{Coordinate, RegionBounds, SUPPORTED_REGION, is_supported};

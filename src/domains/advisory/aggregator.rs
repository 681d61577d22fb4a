//! Recommendation aggregation.
//!
//! A recommendation is built in one pass per call:
//! region check, five concurrent layer fetches, per-layer value extraction,
//! then the sufficiency check. Nothing is cached or retried; a layer that
//! fails is recorded as a gap in the result.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::fetcher::{DEFAULT_FETCH_TIMEOUT, FetchError, HttpLayerFetcher, LayerFetcher, LayerPayload};
use super::layers::{Category, Crop, INORGANIC_UNIT, LayerCatalog, LayerSpec, ORGANIC_UNIT, YIELD_UNIT};
use super::region::{self, Coordinate, RegionBounds, SUPPORTED_REGION};
use crate::core::Result;
use crate::core::config::AdvisoryConfig;

/// Label attached to every recommendation unless configured otherwise.
pub const DEFAULT_DATA_SOURCE: &str = "NextGen Agro-Advisory Service";

/// Whole-operation failures of [`RecommendationAggregator::recommend`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdvisoryError {
    /// The coordinate is outside the supported region. No fetch was made.
    #[error("Location {coordinate} is outside the supported region ({bounds})")]
    UnsupportedRegion {
        coordinate: Coordinate,
        bounds: RegionBounds,
    },

    /// No layer produced a usable value.
    #[error("No recommendation data available for {crop} at this location")]
    InsufficientData {
        crop: Crop,
        failures: Vec<LayerFailure>,
    },
}

/// A layer that could not be fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerFailure {
    pub layer: Category,
    pub message: String,
}

/// Outcome of one layer fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerResult {
    pub category: Category,
    pub outcome: std::result::Result<LayerPayload, LayerFailure>,
}

impl LayerResult {
    /// Usable numeric value, if the fetch succeeded and carried one.
    pub fn value(&self) -> Option<f64> {
        self.outcome.as_ref().ok()?.first_value()
    }
}

// ============================================================================
// Recommendation
// ============================================================================

/// Organic fertilizer rates (tons/ha).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrganicRates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vermicompost: Option<f64>,
}

impl OrganicRates {
    pub fn is_empty(&self) -> bool {
        self.compost.is_none() && self.vermicompost.is_none()
    }
}

/// Inorganic fertilizer rates (kg/ha).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InorganicRates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urea: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nps: Option<f64>,
}

impl InorganicRates {
    pub fn is_empty(&self) -> bool {
        self.urea.is_none() && self.nps.is_none()
    }
}

/// Units attached to each section of a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Units {
    pub organic: &'static str,
    pub inorganic: &'static str,
    pub expected_yield: &'static str,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            organic: ORGANIC_UNIT,
            inorganic: INORGANIC_UNIT,
            expected_yield: YIELD_UNIT,
        }
    }
}

/// Merged fertilizer and yield recommendation for one crop and location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub crop: Crop,
    pub location: Coordinate,
    pub organic: OrganicRates,
    pub inorganic: InorganicRates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_yield: Option<f64>,
    pub units: Units,
    pub data_source: String,
}

impl Recommendation {
    fn empty(crop: Crop, location: Coordinate, data_source: &str) -> Self {
        Self {
            crop,
            location,
            organic: OrganicRates::default(),
            inorganic: InorganicRates::default(),
            expected_yield: None,
            units: Units::default(),
            data_source: data_source.to_string(),
        }
    }

    fn set(&mut self, category: Category, value: f64) {
        match category {
            Category::Compost => self.organic.compost = Some(value),
            Category::Vermicompost => self.organic.vermicompost = Some(value),
            Category::Urea => self.inorganic.urea = Some(value),
            Category::Nps => self.inorganic.nps = Some(value),
            Category::Yield => self.expected_yield = Some(value),
        }
    }

    /// Value recorded for `category`, if any.
    pub fn get(&self, category: Category) -> Option<f64> {
        match category {
            Category::Compost => self.organic.compost,
            Category::Vermicompost => self.organic.vermicompost,
            Category::Urea => self.inorganic.urea,
            Category::Nps => self.inorganic.nps,
            Category::Yield => self.expected_yield,
        }
    }

    /// Categories with no value.
    pub fn missing_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.get(*c).is_none())
            .collect()
    }

    /// True when no category carries a value.
    pub fn is_empty(&self) -> bool {
        self.organic.is_empty() && self.inorganic.is_empty() && self.expected_yield.is_none()
    }
}

// ============================================================================
// Aggregator
// ============================================================================

/// Fans a recommendation request out over the crop's five layers.
pub struct RecommendationAggregator {
    fetcher: Arc<dyn LayerFetcher>,
    catalog: LayerCatalog,
    fetch_timeout: Duration,
    data_source: String,
}

impl RecommendationAggregator {
    pub fn new(fetcher: Arc<dyn LayerFetcher>, catalog: LayerCatalog) -> Self {
        Self {
            fetcher,
            catalog,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            data_source: DEFAULT_DATA_SOURCE.to_string(),
        }
    }

    /// Build an aggregator backed by the HTTP fetcher described in `config`.
    pub fn from_config(config: &AdvisoryConfig) -> Result<Self> {
        let timeout = config.fetch_timeout();
        let fetcher = HttpLayerFetcher::new(&config.base_url, timeout)?;

        Ok(Self::new(Arc::new(fetcher), config.layer_catalog())
            .with_fetch_timeout(timeout)
            .with_data_source(config.data_source.clone()))
    }

    /// Ceiling applied to each individual fetch.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_data_source(mut self, data_source: impl Into<String>) -> Self {
        self.data_source = data_source.into();
        self
    }

    pub fn catalog(&self) -> &LayerCatalog {
        &self.catalog
    }

    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Build the recommendation for `crop` at `coord`.
    #[instrument(skip_all, fields(crop = %crop, lat = coord.latitude, lon = coord.longitude))]
    pub async fn recommend(
        &self,
        crop: Crop,
        coord: Coordinate,
    ) -> std::result::Result<Recommendation, AdvisoryError> {
        if !region::is_supported(&coord) {
            warn!("Rejected location outside supported region: {}", coord);
            return Err(AdvisoryError::UnsupportedRegion {
                coordinate: coord,
                bounds: SUPPORTED_REGION,
            });
        }

        let specs = self.catalog.specs(crop);
        let results = join_all(specs.iter().map(|spec| self.fetch_layer(spec, coord))).await;

        let recommendation = merge(crop, coord, &results, &self.data_source);

        if recommendation.is_empty() {
            let failures: Vec<LayerFailure> = results
                .into_iter()
                .filter_map(|r| r.outcome.err())
                .collect();
            warn!(
                "No usable layer values for {} ({} layer failures)",
                crop,
                failures.len()
            );
            return Err(AdvisoryError::InsufficientData { crop, failures });
        }

        let missing = recommendation.missing_categories();
        if missing.is_empty() {
            info!("Recommendation complete for {}", crop);
        } else {
            info!(
                "Partial recommendation for {}; missing: {:?}",
                crop, missing
            );
        }

        Ok(recommendation)
    }

    /// Fetch one layer, capturing any failure as the layer's outcome.
    async fn fetch_layer(&self, spec: &LayerSpec, coord: Coordinate) -> LayerResult {
        let fetch = self.fetcher.fetch(&spec.layer_id, coord, &spec.date);

        let outcome = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.fetch_timeout)),
        };

        match outcome {
            Ok(payload) => {
                debug!(layer = %spec.category, layer_id = %spec.layer_id, "Layer fetched");
                LayerResult {
                    category: spec.category,
                    outcome: Ok(payload),
                }
            }
            Err(e) => {
                warn!(layer = %spec.category, layer_id = %spec.layer_id, "Layer fetch failed: {}", e);
                LayerResult {
                    category: spec.category,
                    outcome: Err(LayerFailure {
                        layer: spec.category,
                        message: e.to_string(),
                    }),
                }
            }
        }
    }
}

/// Fold layer results into a recommendation. Unusable values are skipped.
fn merge(crop: Crop, coord: Coordinate, results: &[LayerResult], data_source: &str) -> Recommendation {
    let mut recommendation = Recommendation::empty(crop, coord, data_source);

    for result in results {
        match result.value() {
            Some(value) => recommendation.set(result.category, value),
            None if result.outcome.is_ok() => {
                debug!(layer = %result.category, "Layer returned no usable value");
            }
            None => {}
        }
    }

    recommendation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::advisory::test_support::ScriptedFetcher;
    use std::time::Instant;

    fn addis() -> Coordinate {
        Coordinate::new(9.145, 38.7617)
    }

    fn aggregator(fetcher: Arc<ScriptedFetcher>) -> RecommendationAggregator {
        RecommendationAggregator::new(fetcher, LayerCatalog::new("2023-07-01"))
            .with_fetch_timeout(Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_wheat_example() {
        let fetcher = Arc::new(ScriptedFetcher::wheat_example());
        let result = aggregator(fetcher.clone())
            .recommend(Crop::Wheat, addis())
            .await
            .unwrap();

        assert_eq!(result.crop, Crop::Wheat);
        assert_eq!(result.location, addis());
        assert_eq!(result.organic.compost, Some(20.0));
        assert_eq!(result.organic.vermicompost, Some(16.0));
        assert_eq!(result.inorganic.urea, Some(265.67));
        assert_eq!(result.inorganic.nps, Some(0.0));
        assert_eq!(result.expected_yield, Some(3580.53));
        assert_eq!(result.units, Units::default());
        assert_eq!(result.data_source, DEFAULT_DATA_SOURCE);
        assert_eq!(fetcher.calls(), 5);
    }

    #[tokio::test]
    async fn test_outside_region_makes_no_fetches() {
        let fetcher = Arc::new(ScriptedFetcher::wheat_example());
        let aggregator = aggregator(fetcher.clone());

        for coord in [
            Coordinate::new(2.999, 40.0),
            Coordinate::new(15.001, 40.0),
            Coordinate::new(9.0, 31.999),
            Coordinate::new(9.0, 48.001),
            Coordinate::new(51.5, -0.12),
        ] {
            let err = aggregator.recommend(Crop::Wheat, coord).await.unwrap_err();
            assert_eq!(
                err,
                AdvisoryError::UnsupportedRegion {
                    coordinate: coord,
                    bounds: SUPPORTED_REGION,
                }
            );
        }

        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_result_independent_of_completion_order() {
        let forward = Arc::new(
            ScriptedFetcher::new()
                .value_after("maize_compost", "1.5", Duration::from_millis(10))
                .value_after("maize_vcompost", "2.5", Duration::from_millis(20))
                .value_after("maize_urea", "100", Duration::from_millis(30))
                .value_after("maize_nps", "150", Duration::from_millis(40))
                .value_after("maize_optimal_yield", "5000", Duration::from_millis(50)),
        );
        let reverse = Arc::new(
            ScriptedFetcher::new()
                .value_after("maize_compost", "1.5", Duration::from_millis(50))
                .value_after("maize_vcompost", "2.5", Duration::from_millis(40))
                .value_after("maize_urea", "100", Duration::from_millis(30))
                .value_after("maize_nps", "150", Duration::from_millis(20))
                .value_after("maize_optimal_yield", "5000", Duration::from_millis(10)),
        );

        let a = aggregator(forward).recommend(Crop::Maize, addis()).await.unwrap();
        let b = aggregator(reverse).recommend(Crop::Maize, addis()).await.unwrap();

        assert_eq!(a, b);
        assert!(a.missing_categories().is_empty());
    }

    #[tokio::test]
    async fn test_single_timeout_is_partial_success() {
        let fetcher = Arc::new(
            ScriptedFetcher::wheat_example().fail("wheat_urea", FetchError::Timeout(Duration::from_secs(30))),
        );
        let result = aggregator(fetcher)
            .recommend(Crop::Wheat, addis())
            .await
            .unwrap();

        assert_eq!(result.inorganic.urea, None);
        assert_eq!(result.inorganic.nps, Some(0.0));
        assert_eq!(result.organic.compost, Some(20.0));
        assert_eq!(result.organic.vermicompost, Some(16.0));
        assert_eq!(result.expected_yield, Some(3580.53));
        assert_eq!(result.missing_categories(), vec![Category::Urea]);
    }

    #[tokio::test]
    async fn test_hanging_layer_only_fails_itself() {
        let fetcher = Arc::new(ScriptedFetcher::wheat_example().hang("wheat_urea"));
        let aggregator = aggregator(fetcher).with_fetch_timeout(Duration::from_millis(50));

        let result = aggregator.recommend(Crop::Wheat, addis()).await.unwrap();

        assert_eq!(result.missing_categories(), vec![Category::Urea]);
    }

    #[tokio::test]
    async fn test_fetches_run_concurrently() {
        let delay = Duration::from_millis(300);
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .value_after("wheat_compost", "1", delay)
                .value_after("wheat_vcompost", "1", delay)
                .value_after("wheat_urea", "1", delay)
                .value_after("wheat_nps", "1", delay)
                .value_after("wheat_optimal_yield", "1", delay),
        );
        let aggregator = aggregator(fetcher).with_fetch_timeout(Duration::from_secs(5));

        let started = Instant::now();
        aggregator.recommend(Crop::Wheat, addis()).await.unwrap();

        assert!(started.elapsed() < delay * 4);
    }

    #[tokio::test]
    async fn test_all_layers_unusable_is_insufficient() {
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .fail("wheat_compost", FetchError::upstream(Some(500), "boom"))
                .fail("wheat_vcompost", FetchError::malformed("expected object"))
                .value("wheat_urea", "abc")
                .payload("wheat_nps", r#"{"coordinates":[{"value":null}]}"#)
                .payload("wheat_optimal_yield", r#"{}"#),
        );

        let err = aggregator(fetcher)
            .recommend(Crop::Wheat, addis())
            .await
            .unwrap_err();

        match err {
            AdvisoryError::InsufficientData { crop, failures } => {
                assert_eq!(crop, Crop::Wheat);
                let layers: Vec<_> = failures.iter().map(|f| f.layer).collect();
                assert_eq!(layers, vec![Category::Compost, Category::Vermicompost]);
            }
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_all_layers_failing_is_insufficient() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let err = aggregator(fetcher.clone())
            .recommend(Crop::Maize, addis())
            .await
            .unwrap_err();

        assert!(matches!(err, AdvisoryError::InsufficientData { .. }));
        assert_eq!(fetcher.calls(), 5);
    }

    #[tokio::test]
    async fn test_one_value_is_enough() {
        let fetcher = Arc::new(ScriptedFetcher::new().value("wheat_optimal_yield", "2100"));
        let result = aggregator(fetcher)
            .recommend(Crop::Wheat, addis())
            .await
            .unwrap();

        assert_eq!(result.expected_yield, Some(2100.0));
        assert!(result.organic.is_empty());
        assert!(result.inorganic.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_calls_fetch_independently() {
        let fetcher = Arc::new(ScriptedFetcher::wheat_example());
        let aggregator = aggregator(fetcher.clone());

        let (a, b) = tokio::join!(
            aggregator.recommend(Crop::Wheat, addis()),
            aggregator.recommend(Crop::Wheat, addis())
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(fetcher.calls(), 10);
    }

    #[tokio::test]
    async fn test_configured_dates_reach_fetcher() {
        let fetcher = Arc::new(ScriptedFetcher::wheat_example());
        let catalog =
            LayerCatalog::new("2023-07-01").with_date_override(Category::Yield, "2022-11-15");
        let aggregator = RecommendationAggregator::new(fetcher.clone(), catalog);

        aggregator.recommend(Crop::Wheat, addis()).await.unwrap();

        let mut requests = fetcher.requests();
        requests.sort();
        assert_eq!(
            requests,
            vec![
                ("wheat_compost".to_string(), "2023-07-01".to_string()),
                ("wheat_nps".to_string(), "2023-07-01".to_string()),
                ("wheat_optimal_yield".to_string(), "2022-11-15".to_string()),
                ("wheat_urea".to_string(), "2023-07-01".to_string()),
                ("wheat_vcompost".to_string(), "2023-07-01".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_layer_request_is_isolated() {
        let fetcher = Arc::new(ScriptedFetcher::wheat_example());
        let catalog = LayerCatalog::new("2023-07-01").with_date_override(Category::Nps, "  ");
        let aggregator = RecommendationAggregator::new(fetcher.clone(), catalog);

        let result = aggregator.recommend(Crop::Wheat, addis()).await.unwrap();

        assert_eq!(result.missing_categories(), vec![Category::Nps]);
        assert_eq!(result.inorganic.urea, Some(265.67));
        assert_eq!(result.organic.compost, Some(20.0));
        assert_eq!(result.expected_yield, Some(3580.53));
        assert_eq!(fetcher.calls(), 5);
    }

    #[tokio::test]
    async fn test_invalid_requests_everywhere_are_insufficient() {
        let fetcher = Arc::new(ScriptedFetcher::wheat_example());
        let aggregator = RecommendationAggregator::new(fetcher, LayerCatalog::new(""));

        let err = aggregator.recommend(Crop::Wheat, addis()).await.unwrap_err();

        let AdvisoryError::InsufficientData { failures, .. } = err else {
            panic!("expected InsufficientData");
        };
        assert_eq!(failures.len(), 5);
        assert!(failures.iter().all(|f| f.message.contains("date must not be empty")));
    }

    #[tokio::test]
    async fn test_serialized_shape() {
        let fetcher = Arc::new(ScriptedFetcher::wheat_example().fail("wheat_nps", FetchError::malformed("bad")));
        let result = aggregator(fetcher)
            .with_data_source("Test Source")
            .recommend(Crop::Wheat, addis())
            .await
            .unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["crop"], "wheat");
        assert_eq!(json["location"]["latitude"], 9.145);
        assert_eq!(json["organic"]["compost"], 20.0);
        assert_eq!(json["inorganic"]["urea"], 265.67);
        assert!(json["inorganic"].get("nps").is_none());
        assert_eq!(json["expectedYield"], 3580.53);
        assert_eq!(json["units"]["organic"], "tons/ha");
        assert_eq!(json["units"]["expectedYield"], "kg/ha");
        assert_eq!(json["dataSource"], "Test Source");
    }
}

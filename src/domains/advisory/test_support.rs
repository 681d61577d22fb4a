//! Test doubles for the advisory domain.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::aggregator::RecommendationAggregator;
use super::fetcher::{FetchError, LayerFetcher, LayerPayload, RawValue, validate_request};
use super::layers::LayerCatalog;
use super::region::Coordinate;

#[derive(Clone)]
enum Script {
    Respond(LayerPayload, Duration),
    Fail(FetchError),
    Hang,
}

/// In-memory fetcher returning scripted outcomes per layer id.
///
/// Requests go through the same argument checks as the HTTP fetcher.
/// Unscripted layers fail with an upstream 404.
pub(crate) struct ScriptedFetcher {
    scripts: HashMap<String, Script>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Wheat layers at (9.145, 38.7617).
    pub(crate) fn wheat_example() -> Self {
        Self::new()
            .value("wheat_compost", "20")
            .value("wheat_vcompost", "16")
            .value("wheat_urea", "265.67")
            .value("wheat_nps", "0")
            .value("wheat_optimal_yield", "3580.53")
    }

    pub(crate) fn value(self, layer_id: &str, value: &str) -> Self {
        self.value_after(layer_id, value, Duration::ZERO)
    }

    pub(crate) fn value_after(self, layer_id: &str, value: &str, delay: Duration) -> Self {
        let payload = LayerPayload::single(RawValue::Text(value.to_string()));
        self.script(layer_id, Script::Respond(payload, delay))
    }

    /// Respond with a raw upstream body.
    pub(crate) fn payload(self, layer_id: &str, body: &str) -> Self {
        let payload = serde_json::from_str(body).unwrap();
        self.script(layer_id, Script::Respond(payload, Duration::ZERO))
    }

    pub(crate) fn fail(self, layer_id: &str, error: FetchError) -> Self {
        self.script(layer_id, Script::Fail(error))
    }

    /// Never answer.
    pub(crate) fn hang(self, layer_id: &str) -> Self {
        self.script(layer_id, Script::Hang)
    }

    fn script(mut self, layer_id: &str, script: Script) -> Self {
        self.scripts.insert(layer_id.to_string(), script);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(layer_id, date)` pairs in arrival order.
    pub(crate) fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LayerFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        layer_id: &str,
        coord: Coordinate,
        date: &str,
    ) -> Result<LayerPayload, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((layer_id.to_string(), date.to_string()));

        validate_request(layer_id, &coord, date)?;

        match self.scripts.get(layer_id).cloned() {
            Some(Script::Respond(payload, delay)) => {
                tokio::time::sleep(delay).await;
                Ok(payload)
            }
            Some(Script::Fail(e)) => Err(e),
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(LayerPayload::default())
            }
            None => Err(FetchError::upstream(Some(404), "layer not found")),
        }
    }
}

pub(crate) fn aggregator_with(fetcher: Arc<ScriptedFetcher>) -> Arc<RecommendationAggregator> {
    Arc::new(RecommendationAggregator::new(
        fetcher,
        LayerCatalog::new("2023-07-01"),
    ))
}

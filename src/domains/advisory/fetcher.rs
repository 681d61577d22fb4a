//! Upstream layer lookups.
//!
//! [`LayerFetcher`] is the single network capability the aggregator consumes:
//! one `(layer_id, coordinate, date)` lookup returning a parsed
//! [`LayerPayload`] or a [`FetchError`]. [`HttpLayerFetcher`] is the
//! production implementation backed by `reqwest`.
//!
//! Upstream bodies are decoded into typed payloads here, at the boundary.
//! Anything that does not match the expected shape is a
//! [`FetchError::MalformedResponse`] and never reaches the merge logic.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use super::region::Coordinate;
use crate::core::{Error, Result};

/// Default per-fetch ceiling.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest upstream error body echoed back in an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

const USER_AGENT: &str = concat!("fertilizer-advisory-mcp/", env!("CARGO_PKG_VERSION"));

/// Failure of a single layer lookup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The request was rejected locally before any network activity.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No response within the ceiling.
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The upstream answered with a failure status or could not be reached.
    #[error("Upstream error ({}): {message}", status_label(.status))]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    /// The body could not be decoded as a layer payload.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

fn status_label(status: &Option<u16>) -> String {
    status
        .map(|s| format!("HTTP {}", s))
        .unwrap_or_else(|| "no status".to_string())
}

impl FetchError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }
}

// ============================================================================
// Payload
// ============================================================================

/// A recognized upstream payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerPayload {
    /// Zero or more coordinate records; `null` and missing both mean none.
    #[serde(default)]
    pub coordinates: Option<Vec<CoordinateRecord>>,
}

/// One coordinate record inside a payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRecord {
    #[serde(default)]
    pub value: Option<RawValue>,
}

/// Layer values arrive either as JSON numbers or as numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Coerce to a finite float. Non-numeric text yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl LayerPayload {
    /// Payload with a single record carrying `value`.
    pub fn single(value: RawValue) -> Self {
        Self {
            coordinates: Some(vec![CoordinateRecord { value: Some(value) }]),
        }
    }

    /// Numeric value of the first coordinate record, if any.
    pub fn first_value(&self) -> Option<f64> {
        self.coordinates
            .as_deref()?
            .first()?
            .value
            .as_ref()?
            .as_f64()
    }
}

/// Decode an upstream body into a [`LayerPayload`].
///
/// The body and every `coordinates` entry must be JSON objects. Derived
/// struct decoding alone would also accept positional arrays.
pub fn parse_payload(body: &[u8]) -> std::result::Result<LayerPayload, FetchError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| FetchError::malformed(e.to_string()))?;

    let Some(object) = value.as_object() else {
        return Err(FetchError::malformed("expected a JSON object"));
    };
    let records_are_objects = object
        .get("coordinates")
        .and_then(|c| c.as_array())
        .is_none_or(|records| records.iter().all(|record| record.is_object()));
    if !records_are_objects {
        return Err(FetchError::malformed("coordinate records must be JSON objects"));
    }

    serde_json::from_value(value).map_err(|e| FetchError::malformed(e.to_string()))
}

// ============================================================================
// Fetcher contract
// ============================================================================

/// One labeled remote lookup.
///
/// Implementations must bound their wait, report non-success statuses as
/// [`FetchError::Upstream`], undecodable bodies as
/// [`FetchError::MalformedResponse`], and reject bad inputs with
/// [`FetchError::InvalidArgument`] before touching the network.
#[async_trait]
pub trait LayerFetcher: Send + Sync {
    async fn fetch(
        &self,
        layer_id: &str,
        coord: Coordinate,
        date: &str,
    ) -> std::result::Result<LayerPayload, FetchError>;
}

/// Local preconditions shared by all fetchers.
pub fn validate_request(
    layer_id: &str,
    coord: &Coordinate,
    date: &str,
) -> std::result::Result<(), FetchError> {
    if layer_id.trim().is_empty() {
        return Err(FetchError::invalid_argument("layer id must not be empty"));
    }
    if !coord.is_on_globe() {
        return Err(FetchError::invalid_argument(format!(
            "coordinate {} is outside latitude [-90, 90] / longitude [-180, 180]",
            coord
        )));
    }
    if date.trim().is_empty() {
        return Err(FetchError::invalid_argument("date must not be empty"));
    }
    Ok(())
}

// ============================================================================
// HTTP implementation
// ============================================================================

/// Fetches layers with `GET {base_url}/layers/{layer_id}/point?lat=&lon=&date=`.
#[derive(Debug, Clone)]
pub struct HttpLayerFetcher {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpLayerFetcher {
    /// Build a fetcher for `base_url` with the given per-request ceiling.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::config(format!("Invalid advisory base URL '{}': {}", base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "Advisory base URL '{}' cannot have path segments",
                base_url
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn layer_url(&self, layer_id: &str) -> std::result::Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::invalid_argument("base URL cannot have path segments"))?
            .pop_if_empty()
            .extend(["layers", layer_id, "point"]);
        Ok(url)
    }

    /// Send the request and read the whole body.
    async fn exchange(
        &self,
        url: Url,
        coord: Coordinate,
        date: &str,
    ) -> std::result::Result<LayerPayload, FetchError> {
        let response = self
            .client
            .get(url)
            .query(&[
                ("lat", coord.latitude.to_string()),
                ("lon", coord.longitude.to_string()),
                ("date", date.to_string()),
            ])
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                body.chars().take(MAX_ERROR_BODY_CHARS).collect()
            };
            return Err(FetchError::upstream(Some(status.as_u16()), message));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        debug!("Layer response received: {} bytes", body.len());

        parse_payload(&body)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else if e.is_decode() {
            FetchError::malformed(e.to_string())
        } else {
            FetchError::upstream(e.status().map(|s| s.as_u16()), e.to_string())
        }
    }
}

#[async_trait]
impl LayerFetcher for HttpLayerFetcher {
    #[instrument(skip(self), fields(lat = coord.latitude, lon = coord.longitude))]
    async fn fetch(
        &self,
        layer_id: &str,
        coord: Coordinate,
        date: &str,
    ) -> std::result::Result<LayerPayload, FetchError> {
        validate_request(layer_id, &coord, date)?;
        let url = self.layer_url(layer_id)?;

        debug!("Fetching layer from {}", url);

        match tokio::time::timeout(self.timeout, self.exchange(url, coord, date)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        }
    }
}

//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure populated from
//! defaults, an optional `.env` file, and `MCP_*` environment variables.

use super::transport::TransportConfig;
use crate::domains::advisory::{
    Category, Coordinate, DEFAULT_DATA_SOURCE, DEFAULT_FETCH_TIMEOUT, LayerCatalog,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Upstream advisory service configuration.
    pub advisory: AdvisoryConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_timestamps: true,
        }
    }
}

impl LoggingConfig {
    /// Load logging settings from `MCP_LOG_LEVEL` and `MCP_LOG_TIMESTAMPS`.
    ///
    /// Usable on its own so logging can start before the rest of the
    /// configuration is loaded.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: std::env::var("MCP_LOG_LEVEL").unwrap_or(defaults.level),
            with_timestamps: std::env::var("MCP_LOG_TIMESTAMPS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.with_timestamps),
        }
    }
}

/// Configuration for the upstream advisory service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    /// Base URL of the advisory API. Layer lookups go to
    /// `{base_url}/layers/{layer_id}/point`.
    pub base_url: String,

    /// Ceiling for each individual layer fetch, in seconds.
    pub timeout_secs: u64,

    /// Query date shared by all layers.
    pub query_date: String,

    /// Per-category query dates that replace `query_date`.
    #[serde(default)]
    pub date_overrides: BTreeMap<Category, String>,

    /// Label attached to every recommendation.
    pub data_source: String,

    /// Location used when a tool call omits coordinates.
    #[serde(default)]
    pub default_location: Option<Coordinate>,
}

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

pub const DEFAULT_QUERY_DATE: &str = "2023-07-01";

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            query_date: DEFAULT_QUERY_DATE.to_string(),
            date_overrides: BTreeMap::new(),
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            default_location: None,
        }
    }
}

impl AdvisoryConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Layer catalog with the configured query dates.
    pub fn layer_catalog(&self) -> LayerCatalog {
        self.date_overrides.iter().fold(
            LayerCatalog::new(self.query_date.clone()),
            |catalog, (category, date)| catalog.with_date_override(*category, date.clone()),
        )
    }

    fn load_env(&mut self) {
        if let Ok(base_url) = std::env::var("MCP_ADVISORY_BASE_URL") {
            self.base_url = base_url;
            info!("Advisory base URL: {}", self.base_url);
        } else {
            warn!(
                "MCP_ADVISORY_BASE_URL not set - using default {}",
                DEFAULT_BASE_URL
            );
        }

        if let Some(secs) = parse_env::<u64>("MCP_ADVISORY_TIMEOUT_SECS") {
            if secs == 0 {
                warn!("MCP_ADVISORY_TIMEOUT_SECS must be positive, keeping {}s", self.timeout_secs);
            } else {
                self.timeout_secs = secs;
            }
        }

        if let Ok(date) = std::env::var("MCP_ADVISORY_QUERY_DATE") {
            if date.trim().is_empty() {
                warn!("MCP_ADVISORY_QUERY_DATE is empty, keeping {}", self.query_date);
            } else {
                self.query_date = date.trim().to_string();
            }
        }

        for category in Category::ALL {
            let key = format!("MCP_ADVISORY_DATE_{}", category.as_str().to_uppercase());
            if let Ok(date) = std::env::var(&key) {
                if !date.trim().is_empty() {
                    info!("Query date for {} overridden to {}", category, date.trim());
                    self.date_overrides
                        .insert(category, date.trim().to_string());
                }
            }
        }

        if let Ok(label) = std::env::var("MCP_ADVISORY_DATA_SOURCE") {
            self.data_source = label;
        }

        let latitude = parse_env::<f64>("MCP_DEFAULT_LATITUDE");
        let longitude = parse_env::<f64>("MCP_DEFAULT_LONGITUDE");
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => {
                let location = Coordinate::new(lat, lon);
                if location.is_on_globe() {
                    info!("Default location set to {}", location);
                    self.default_location = Some(location);
                } else {
                    warn!("Ignoring default location {}: not a valid coordinate", location);
                }
            }
            (None, None) => {}
            _ => warn!(
                "Both MCP_DEFAULT_LATITUDE and MCP_DEFAULT_LONGITUDE must be set; ignoring default location"
            ),
        }
    }
}

/// Read and parse an environment variable, warning on unparseable values.
pub(crate) fn parse_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "fertilizer-advisory-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig::default(),
            transport: TransportConfig::default(),
            advisory: AdvisoryConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`, `MCP_ADVISORY_BASE_URL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        config.logging = LoggingConfig::from_env();
        config.transport = TransportConfig::from_env();
        config.advisory.load_env();

        config
    }
}

/// Serializes tests that mutate process environment variables.
#[cfg(test)]
pub(crate) static ENV_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    const ADVISORY_VARS: &[&str] = &[
        "MCP_ADVISORY_BASE_URL",
        "MCP_ADVISORY_TIMEOUT_SECS",
        "MCP_ADVISORY_QUERY_DATE",
        "MCP_ADVISORY_DATE_NPS",
        "MCP_ADVISORY_DATA_SOURCE",
        "MCP_DEFAULT_LATITUDE",
        "MCP_DEFAULT_LONGITUDE",
    ];

    fn clear_advisory_env() {
        for key in ADVISORY_VARS {
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_advisory_defaults() {
        let config = Config::default();
        assert_eq!(config.advisory.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.advisory.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.advisory.data_source, DEFAULT_DATA_SOURCE);
        assert!(config.advisory.default_location.is_none());
        assert!(config.advisory.date_overrides.is_empty());
    }

    #[test]
    fn test_advisory_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_advisory_env();
        unsafe {
            std::env::set_var("MCP_ADVISORY_BASE_URL", "https://advisory.test/api");
            std::env::set_var("MCP_ADVISORY_TIMEOUT_SECS", "12");
            std::env::set_var("MCP_ADVISORY_QUERY_DATE", "2024-01-15");
            std::env::set_var("MCP_ADVISORY_DATE_NPS", "2023-12-01");
            std::env::set_var("MCP_ADVISORY_DATA_SOURCE", "Test Source");
        }

        let config = Config::from_env();
        assert_eq!(config.advisory.base_url, "https://advisory.test/api");
        assert_eq!(config.advisory.timeout_secs, 12);
        assert_eq!(config.advisory.query_date, "2024-01-15");
        assert_eq!(config.advisory.data_source, "Test Source");

        let catalog = config.advisory.layer_catalog();
        assert_eq!(catalog.date_for(Category::Nps), "2023-12-01");
        assert_eq!(catalog.date_for(Category::Urea), "2024-01-15");

        clear_advisory_env();
    }

    #[test]
    fn test_invalid_numbers_keep_defaults() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_advisory_env();
        unsafe {
            std::env::set_var("MCP_ADVISORY_TIMEOUT_SECS", "soon");
            std::env::set_var("MCP_DEFAULT_LATITUDE", "north");
            std::env::set_var("MCP_DEFAULT_LONGITUDE", "38.7");
        }

        let config = Config::from_env();
        assert_eq!(config.advisory.timeout_secs, 30);
        assert!(config.advisory.default_location.is_none());

        unsafe {
            std::env::set_var("MCP_ADVISORY_TIMEOUT_SECS", "0");
        }
        let config = Config::from_env();
        assert_eq!(config.advisory.timeout_secs, 30);

        clear_advisory_env();
    }

    #[test]
    fn test_default_location_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_advisory_env();
        unsafe {
            std::env::set_var("MCP_DEFAULT_LATITUDE", "9.145");
            std::env::set_var("MCP_DEFAULT_LONGITUDE", "38.7617");
        }

        let config = Config::from_env();
        assert_eq!(
            config.advisory.default_location,
            Some(Coordinate::new(9.145, 38.7617))
        );

        unsafe {
            std::env::set_var("MCP_DEFAULT_LATITUDE", "120");
        }
        let config = Config::from_env();
        assert!(config.advisory.default_location.is_none());

        clear_advisory_env();
    }

    #[test]
    fn test_logging_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_LOG_LEVEL", "debug");
            std::env::set_var("MCP_LOG_TIMESTAMPS", "false");
        }

        let config = Config::from_env();
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.with_timestamps);

        unsafe {
            std::env::remove_var("MCP_LOG_LEVEL");
            std::env::remove_var("MCP_LOG_TIMESTAMPS");
        }
        let logging = LoggingConfig::from_env();
        assert_eq!(logging.level, "info");
        assert!(logging.with_timestamps);
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let mut config = Config::default();
        config
            .advisory
            .date_overrides
            .insert(Category::Yield, "2022-06-01".to_string());

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.advisory.date_overrides.get(&Category::Yield).map(String::as_str),
            Some("2022-06-01")
        );
    }
}

//! Error types and handling for the MCP server.
//!
//! Domain errors (`FetchError`, `AdvisoryError`, `ToolError`,
//! `ResourceError`) are reported through tool and resource results. This
//! type covers what can stop the server itself: startup configuration and
//! the transport layer.

use thiserror::Error;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failures.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::TransportError;

    #[test]
    fn test_transport_errors_convert() {
        fn start() -> Result<()> {
            Err(TransportError::init("stdin closed"))?
        }

        let err = start().unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(err.to_string().starts_with("Transport error:"));
    }

    #[test]
    fn test_config_error_message() {
        let err = Error::config("bad base URL");
        assert_eq!(err.to_string(), "Configuration error: bad base URL");
    }
}

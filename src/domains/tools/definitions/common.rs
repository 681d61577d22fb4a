//! Common utilities shared across tools.
//!
//! Result builders and the conversion from `CallToolResult` to the JSON shape
//! returned over the HTTP transport.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use tracing::warn;

/// Create an error result with a formatted message.
pub fn error_result(message: &str) -> CallToolResult {
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(message.to_string())])
}

/// Create a success result with text content.
pub fn success_result(content: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(content)])
}

/// Create a success result with a text summary and structured content.
///
/// Falls back to text-only if the data cannot be serialized.
pub fn structured_result<T: Serialize>(summary: String, data: T) -> CallToolResult {
    match serde_json::to_value(&data) {
        Ok(structured) => CallToolResult {
            content: vec![Content::text(summary)],
            structured_content: Some(structured),
            is_error: Some(false),
            meta: None,
        },
        Err(e) => {
            warn!("Failed to serialize structured content: {}", e);
            success_result(summary)
        }
    }
}

/// Create an error result that also carries structured details.
pub fn structured_error<T: Serialize>(message: String, details: T) -> CallToolResult {
    warn!("{}", message);
    CallToolResult {
        content: vec![Content::text(message)],
        structured_content: serde_json::to_value(&details).ok(),
        is_error: Some(true),
        meta: None,
    }
}

/// Convert a tool result to the JSON body used by the HTTP transport.
#[cfg(feature = "http")]
pub fn to_http_response(result: CallToolResult) -> serde_json::Value {
    let mut response = serde_json::json!({
        "content": result.content,
        "isError": result.is_error.unwrap_or(false)
    });

    if let (Some(structured), Some(object)) =
        (result.structured_content, response.as_object_mut())
    {
        object.insert("structuredContent".to_string(), structured);
    }

    response
}

/// Format a rate for display, dropping trailing zeros.
pub fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

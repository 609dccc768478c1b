//! Classified error type for tool calls.
//!
//! Every failure that crosses the dispatch boundary is a [`McpError`] built
//! through one of four constructors. Each constructor bakes a recovery
//! suggestion into the message so a calling agent can self-correct without a
//! second round trip: list valid IDs on `NOT_FOUND`, fix the fields named in
//! `details.issues` on `VALIDATION_ERROR`, act on the HTTP status hint on
//! `UPSTREAM_ERROR`.

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// A specialized Result type for tool and gateway operations.
pub type McpResult<T> = Result<T, McpError>;

/// The closed set of error kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    /// Unknown identifier or unknown tool name.
    #[serde(rename = "NOT_FOUND")]
    NotFound,
    /// Malformed or missing arguments.
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,
    /// The bexio API rejected or failed to service the request.
    #[serde(rename = "UPSTREAM_ERROR")]
    UpstreamError,
    /// A defect in this layer itself.
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::UpstreamError => "UPSTREAM_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        f.write_str(s)
    }
}

/// An immutable classified error.
///
/// Never constructed field by field; use [`McpError::not_found`],
/// [`McpError::validation`], [`McpError::upstream`] or
/// [`McpError::internal`].
#[derive(Debug, Clone, Error, Serialize)]
#[error("{message}")]
pub struct McpError {
    /// Which of the four kinds this error is.
    pub code: ErrorCode,
    /// Human-readable message with an embedded recovery suggestion.
    pub message: String,
    /// Optional structured context (e.g. validation issues).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Original HTTP status for upstream failures.
    #[serde(rename = "statusCode", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl McpError {
    /// Resource not found. Suggests listing resources first.
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self {
            code: ErrorCode::NotFound,
            message: format!(
                "{resource} with ID {id} not found. Try listing {}s first to find valid IDs.",
                resource.to_lowercase()
            ),
            details: Some(json!({ "resource": resource, "id": id.to_string() })),
            status_code: None,
        }
    }

    /// Validation failure, with optional field-level issues in `details`.
    pub fn validation(message: impl fmt::Display, details: Option<Value>) -> Self {
        Self {
            code: ErrorCode::ValidationError,
            message: format!(
                "Validation failed: {message}. Check the required fields and their formats."
            ),
            details,
            status_code: None,
        }
    }

    /// Upstream bexio failure, with a status-specific recovery suggestion.
    pub fn upstream(
        message: impl fmt::Display,
        status_code: Option<u16>,
        details: Option<Value>,
    ) -> Self {
        let suggestion = match status_code {
            Some(401) => " Check that BEXIO_API_TOKEN is valid and not expired.",
            Some(403) => " The API token may lack permissions for this operation.",
            Some(429) => " Rate limit exceeded. Wait a moment before retrying.",
            Some(s) if s >= 500 => " Bexio server error. Retry the request in a few seconds.",
            _ => "",
        };
        Self {
            code: ErrorCode::UpstreamError,
            message: format!("Bexio API error: {message}.{suggestion}"),
            details,
            status_code,
        }
    }

    /// A defect in the gateway layer itself.
    pub fn internal(message: impl fmt::Display) -> Self {
        Self {
            code: ErrorCode::InternalError,
            message: format!("Internal error: {message}. Please report this issue."),
            details: None,
            status_code: None,
        }
    }

    /// Attaches structured context to an existing error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::internal(format!("JSON serialization failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_resource_and_id() {
        let err = McpError::not_found("Contact", 42);
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(err.message.contains("Contact with ID 42 not found"));
        assert!(err.message.contains("listing contacts first"));
    }

    #[test]
    fn upstream_suggestions_depend_on_status() {
        let unauthorized = McpError::upstream("Unauthorized", Some(401), None);
        assert!(unauthorized.message.contains("BEXIO_API_TOKEN"));

        let forbidden = McpError::upstream("Forbidden", Some(403), None);
        assert!(forbidden.message.contains("lack permissions"));

        let throttled = McpError::upstream("Too Many Requests", Some(429), None);
        assert!(throttled.message.contains("Rate limit"));

        let server = McpError::upstream("Internal Server Error", Some(503), None);
        assert!(server.message.contains("Retry the request"));

        let network = McpError::upstream("No response received from server", None, None);
        assert_eq!(network.status_code, None);
    }

    #[test]
    fn serializes_to_wire_shape() {
        let err = McpError::upstream("Forbidden", Some(403), Some(json!({"endpoint": "/employee"})));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["code"], "UPSTREAM_ERROR");
        assert_eq!(value["statusCode"], 403);
        assert_eq!(value["details"]["endpoint"], "/employee");
    }

    #[test]
    fn omits_absent_optional_fields() {
        let err = McpError::internal("boom");
        let value = serde_json::to_value(&err).unwrap();
        assert!(value.get("details").is_none());
        assert!(value.get("statusCode").is_none());
    }
}

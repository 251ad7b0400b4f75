//! Error type for the ticket API client, and the mapping from failed HTTP
//! responses into it.
//!
//! # Design
//! Every failure the client can surface is one `ApiError` value: a
//! human-readable message, a numeric status code, and the raw JSON error body
//! when the server sent one. Failures that never produced a response (network
//! errors, payloads that refuse to serialize, bodies that do not decode) use
//! the fixed internal status 500. Callers branch on the status through the
//! `is_*` helpers instead of on variants.

use serde_json::Value;
use thiserror::Error;

use crate::http::HttpResponse;

pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";
pub const FALLBACK_MESSAGE: &str = "Something went wrong";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error occurred";

/// Status used for failures that did not come from a server response.
pub const INTERNAL_STATUS: u16 = 500;

/// The failure half of every client result.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} (status {status_code})")]
pub struct ApiError {
    pub message: String,
    pub status_code: u16,
    /// Parsed error body, kept for callers that need field-level detail.
    pub data: Option<Value>,
}

/// Uniform result of every client operation.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            status_code,
            data: None,
        }
    }

    /// Map a non-success response into an error.
    ///
    /// A body that is not JSON is replaced by `{"message": "Unknown error occurred"}`.
    pub fn from_response(response: &HttpResponse) -> Self {
        let data = serde_json::from_str::<Value>(&response.body)
            .unwrap_or_else(|_| serde_json::json!({ "message": UNKNOWN_ERROR_MESSAGE }));

        let message = data
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(FALLBACK_MESSAGE)
            .to_string();

        Self {
            message,
            status_code: response.status,
            data: Some(data),
        }
    }

    /// The request never received a response.
    pub fn network() -> Self {
        Self::new(NETWORK_ERROR_MESSAGE, INTERNAL_STATUS)
    }

    /// A success response whose body did not match the expected shape.
    pub fn decode(detail: impl std::fmt::Display) -> Self {
        Self::new(format!("invalid response body: {detail}"), INTERNAL_STATUS)
    }

    /// The request payload could not be serialized to JSON.
    pub fn encode(detail: impl std::fmt::Display) -> Self {
        Self::new(format!("invalid request payload: {detail}"), INTERNAL_STATUS)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code == 401 || self.status_code == 403
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }

    pub fn is_validation_error(&self) -> bool {
        self.status_code == 400
    }

    /// Collapse field-level validation errors into one line.
    ///
    /// When `data.errors` is an object or array its values are joined with
    /// `", "`; otherwise the top-level message is returned.
    pub fn format_message(&self) -> String {
        let errors = self
            .data
            .as_ref()
            .and_then(|d| d.get("errors"))
            .filter(|e| !e.is_null());

        match errors {
            Some(Value::Object(map)) => map.values().map(join_value).collect::<Vec<_>>().join(", "),
            Some(Value::Array(items)) => items.iter().map(join_value).collect::<Vec<_>>().join(", "),
            _ => self.message.clone(),
        }
    }
}

fn join_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(join_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

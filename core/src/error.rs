//! Error type for resource actions.
//!
//! # Design
//! All failures travel through one path: an action that fails records the
//! error in the module state and hands the same error back to the caller.
//! Variants exist for diagnostics only; nothing in the crate branches on the
//! HTTP status. `response_payload` extracts what the state's `error` field
//! should hold when the server actually answered.

use serde_json::Value;

/// Errors returned by `ResourceClient` and module actions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, TLS).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body did not have the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The token provider had no anti-forgery token to attach.
    #[error("no CSRF token available")]
    MissingCsrfToken,
}

impl ApiError {
    /// The response body the server sent with this failure, if any.
    ///
    /// JSON bodies are returned parsed; anything else comes back as a JSON
    /// string. Errors without a response, with an empty body, or whose body
    /// parses to a falsy value (`null`, `false`, `0`, `""`) yield `None`.
    pub fn response_payload(&self) -> Option<Value> {
        let ApiError::Http { body, .. } = self else {
            return None;
        };
        let payload =
            serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.clone()));
        Some(payload).filter(is_truthy)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

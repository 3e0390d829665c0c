//! Error taxonomy and provider error normalization.

use serde_json::Value;
use thiserror::Error;

/// Failure reported by SendGrid itself.
///
/// `errors` is the provider payload exactly as received: the `errors` array for
/// the v3 API, or the whole response object for the legacy API.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("provider error (status {status}){}", format_messages(.errors))]
pub struct ProviderError {
    status: u16,
    errors: Value,
}

impl ProviderError {
    /// HTTP status of the response that carried the error.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The provider payload, unmodified.
    pub fn errors(&self) -> &Value {
        &self.errors
    }

    /// Consume the error and return the provider payload.
    pub fn into_errors(self) -> Value {
        self.errors
    }

    /// `true` for 4xx statuses, i.e. the request itself was rejected.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// `true` for 5xx statuses.
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    /// Human-readable messages found in the payload.
    ///
    /// Understands both `[{"message": ...}]` entries and the legacy
    /// `{"errors": ["..."]}` / `{"error": ...}` shapes.
    pub fn messages(&self) -> Vec<&str> {
        collect_messages(&self.errors)
    }
}

fn collect_messages(errors: &Value) -> Vec<&str> {
    match errors {
        Value::Array(entries) => entries.iter().filter_map(entry_message).collect(),
        Value::Object(map) => {
            if let Some(Value::Array(entries)) = map.get("errors") {
                entries.iter().filter_map(entry_message).collect()
            } else {
                map.get("error").and_then(entry_message).into_iter().collect()
            }
        }
        other => entry_message(other).into_iter().collect(),
    }
}

fn entry_message(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Object(map) => map.get("message").and_then(Value::as_str),
        _ => None,
    }
}

fn format_messages(errors: &Value) -> String {
    let messages = collect_messages(errors);
    if messages.is_empty() {
        String::new()
    } else {
        format!(": {}", messages.join("; "))
    }
}

/// Build a [`ProviderError`] from a status code and the provider's error payload.
pub fn normalize(status: u16, payload: Value) -> ProviderError {
    ProviderError {
        status,
        errors: payload,
    }
}

/// JavaScript-style truthiness used by both wire contracts to decide whether an
/// error field is populated.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Errors that can occur when talking to SendGrid.
#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was missing or invalid. Nothing was sent.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// SendGrid answered with an error payload or an error status.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Network or HTTP-level failure (DNS, connect, TLS, timeout, body read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A body could not be serialized or the response was not valid JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn argument(message: impl Into<String>) -> Self {
        Error::Argument(message.into())
    }

    /// `true` when the call was rejected locally before any I/O.
    pub fn is_argument(&self) -> bool {
        matches!(self, Error::Argument(_))
    }

    /// The provider error, if SendGrid reported one.
    pub fn provider(&self) -> Option<&ProviderError> {
        match self {
            Error::Provider(e) => Some(e),
            _ => None,
        }
    }

    /// HTTP status associated with the failure, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Provider(e) => Some(e.status()),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

//! Normalized error shape for outbound calls.
//!
//! Every failure of the request client, whether the transport broke or the
//! remote service answered with a non-2xx status, is converted into an
//! [`ApiError`] exactly once and returned as the `Err` side of the call.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

const TRANSPORT_MESSAGE: &str = "Connection error. Please try again later.";
const INTERNAL_MESSAGE: &str = "Internal error. Our team has been notified.";
const UNKNOWN_MESSAGE: &str = "Unknown error";

/// A failed outbound call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP-like status code.
    pub status: u16,
    /// Human-readable message.
    pub message: String,
    /// Application error code reported by the remote service (e.g. "TOKEN_EXPIRED").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Additional details reported by the remote service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

/// Error body shape understood from remote services.
#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    message: Option<String>,
    code: Option<String>,
    details: Option<Map<String, Value>>,
}

impl ApiError {
    /// Creates an error with a status and message.
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
            details: None,
        }
    }

    /// Sets the application error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the error details.
    #[must_use]
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }

    /// The remote service could not be reached.
    #[must_use]
    pub fn transport() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE.as_u16(), TRANSPORT_MESSAGE)
    }

    /// Any failure that is neither a transport failure nor a remote HTTP error.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), INTERNAL_MESSAGE)
    }

    /// Builds the error for a non-2xx response.
    ///
    /// `message`, `code` and `details` are taken from a JSON body when present.
    /// The message falls back to the status reason phrase.
    #[must_use]
    pub fn from_http_response(status: StatusCode, body: &[u8]) -> Self {
        let fallback = status.canonical_reason().unwrap_or(UNKNOWN_MESSAGE);
        let mut error = Self::new(status.as_u16(), fallback);

        if let Ok(remote) = serde_json::from_slice::<RemoteErrorBody>(body) {
            if let Some(message) = remote.message {
                error.message = message;
            }
            error.code = remote.code;
            error.details = remote.details;
        }

        error
    }

    /// Classifies a reqwest failure.
    ///
    /// Connection failures and timeouts are transport failures (503); anything
    /// else, such as a body that fails to decode, is internal (500).
    #[must_use]
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::transport().with_code("TIMEOUT")
        } else if err.is_connect() || err.is_request() {
            Self::transport().with_code("NETWORK_ERROR")
        } else {
            Self::internal()
        }
    }

    /// Returns true if the remote service could not be reached.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.status == StatusCode::SERVICE_UNAVAILABLE.as_u16()
            && matches!(self.code.as_deref(), Some("TIMEOUT" | "NETWORK_ERROR"))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({}): {}", self.status, code, self.message),
            None => write!(f, "{}: {}", self.status, self.message),
        }
    }
}

impl std::error::Error for ApiError {}

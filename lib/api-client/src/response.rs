//! Successful response bodies.

use crate::error::ApiError;
use crate::request::ResponseType;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A successful response, read according to the requested [`ResponseType`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Text(String),
    Blob(Vec<u8>),
}

impl ApiResponse {
    pub(crate) async fn read(
        response: reqwest::Response,
        response_type: ResponseType,
    ) -> Result<Self, ApiError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        match response_type {
            ResponseType::Blob => Ok(Self::Blob(bytes.to_vec())),
            ResponseType::Text => String::from_utf8(bytes.to_vec())
                .map(Self::Text)
                .map_err(|e| {
                    tracing::warn!(error = %e, "response body is not valid UTF-8");
                    ApiError::internal()
                }),
            // An empty success body (e.g. 204) reads as null.
            ResponseType::Json if bytes.is_empty() => Ok(Self::Json(Value::Null)),
            ResponseType::Json => serde_json::from_slice(&bytes).map(Self::Json).map_err(|e| {
                tracing::warn!(error = %e, "response body is not valid JSON");
                ApiError::internal()
            }),
        }
    }

    /// Deserializes a JSON response into `T`.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the response is not JSON or does not match `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            Self::Json(value) => serde_json::from_value(value).map_err(|e| {
                tracing::warn!(error = %e, "response does not match the expected shape");
                ApiError::internal()
            }),
            other => {
                tracing::warn!(kind = other.kind(), "expected a JSON response");
                Err(ApiError::internal())
            }
        }
    }

    /// Returns the body as text, if it was read as text.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the raw bytes, if the body was read as a blob.
    #[must_use]
    pub fn into_blob(self) -> Option<Vec<u8>> {
        match self {
            Self::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }
}

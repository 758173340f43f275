//! Identity exchange error types.

use iugu_portal_api_client::ApiError;
use iugu_portal_core::Action;
use std::fmt;

/// Errors from the identity provider calls.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeError {
    /// The outbound call failed.
    Request(ApiError),
    /// The code exchange response carried no access token.
    MissingAccessToken,
    /// The verify response carried no boolean for a requested action.
    MissingAction {
        /// The action without a boolean entry.
        action: Action,
    },
    /// The response body was not the documented shape.
    InvalidResponse {
        /// Error details.
        details: String,
    },
}

impl ExchangeError {
    /// Returns the normalized error to surface at a route boundary.
    ///
    /// Protocol violations by the remote service are reported as 500.
    #[must_use]
    pub fn to_api_error(&self) -> ApiError {
        match self {
            Self::Request(err) => err.clone(),
            other => ApiError::new(500, other.to_string()).with_code("INVALID_RESPONSE"),
        }
    }
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(err) => write!(f, "identity provider request failed: {}", err),
            Self::MissingAccessToken => {
                write!(f, "invalid response from identity provider: no access token")
            }
            Self::MissingAction { action } => {
                write!(
                    f,
                    "invalid response from identity provider verify for action: {}",
                    action
                )
            }
            Self::InvalidResponse { details } => {
                write!(f, "invalid response from identity provider: {}", details)
            }
        }
    }
}

impl std::error::Error for ExchangeError {}

impl From<ApiError> for ExchangeError {
    fn from(err: ApiError) -> Self {
        Self::Request(err)
    }
}

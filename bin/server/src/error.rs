//! Domain error types for server operations.
//!
//! Internal details are logged where the error is converted; only user-safe
//! messages leave the server.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use iugu_portal_authz::ExchangeError;
use iugu_portal_platform_access::AuthenticationError;
use leptos::server_fn::error::ServerFnError;
use rootcause::prelude::Report;
use serde_json::json;
use std::fmt;

/// Errors from checking the caller's permissions.
#[derive(Debug)]
pub enum PermissionError {
    /// No session cookie on the request.
    NotAuthenticated,
    /// The session token could not be decoded.
    InvalidSession(Report<AuthenticationError>),
    /// The identity provider call failed.
    Verify(Report<ExchangeError>),
}

impl PermissionError {
    /// Message safe to show to the caller.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::NotAuthenticated | Self::InvalidSession(_) => "Not authenticated".to_string(),
            Self::Verify(report) => report.current_context().to_api_error().message,
        }
    }

    /// Convert to a user-safe ServerFnError.
    pub fn into_server_error(self) -> ServerFnError {
        ServerFnError::new(self.public_message())
    }
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "not authenticated"),
            Self::InvalidSession(report) => {
                write!(f, "invalid session: {}", report.current_context())
            }
            Self::Verify(report) => {
                write!(f, "permission check failed: {}", report.current_context())
            }
        }
    }
}

impl std::error::Error for PermissionError {}

impl IntoResponse for PermissionError {
    fn into_response(self) -> Response {
        match &self {
            Self::NotAuthenticated => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "allowed": false }))).into_response()
            }
            Self::InvalidSession(_) => {
                tracing::debug!(error = %self, "rejecting undecodable session");
                (StatusCode::UNAUTHORIZED, Json(json!({ "allowed": false }))).into_response()
            }
            Self::Verify(_) => {
                tracing::error!(error = %self, "permission check failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "allowed": false, "error": self.public_message() })),
                )
                    .into_response()
            }
        }
    }
}

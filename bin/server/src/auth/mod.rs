//! Authentication module for the iugu-portal server.
//!
//! This module provides:
//! - The request gate middleware in front of every page
//! - OAuth callback, login, logout and permission verification routes
//! - Session cookie helpers and the shared permission check
//!
//! # Access Model
//!
//! A request is authenticated when it carries the session cookie. The cookie
//! holds the identity provider's access token verbatim; it is decoded only to
//! read the subject for permission checks, and the provider's verify endpoint
//! decides every capability. Nothing about the session is stored server-side.

pub mod middleware;
pub mod routes;
pub mod session;

use crate::config::{ServerConfig, SessionConfig};
use axum::Router;
use axum::extract::FromRef;
use axum::routing::get;
use iugu_portal_api_client::{ApiError, ServerRequestClient, Transport};
use iugu_portal_authz::IdentityExchange;
use iugu_portal_platform_access::{ConfigurationError, RequestGate};
use rootcause::prelude::Report;
use std::sync::Arc;

pub use middleware::gate;
pub use routes::{callback, login, logout, verify};
pub use session::check_permissions;

/// Shared application state.
pub struct AppState {
    /// Identity provider calls (code exchange and verify).
    pub identity: IdentityExchange,
    /// Request gate with the authorize URL resolved.
    pub gate: RequestGate,
    /// Authorize URL used by the login page, without forced re-authentication.
    pub login_url: String,
    /// Session cookie configuration.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        identity: IdentityExchange,
        gate: RequestGate,
        login_url: String,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            identity,
            gate,
            login_url,
            session_config,
        }
    }

    /// Builds the state from configuration, refusing incomplete OAuth settings.
    ///
    /// # Errors
    ///
    /// Returns a [`StartupError`] when the gate cannot be configured or the HTTP
    /// client cannot be created.
    pub fn from_config(config: ServerConfig) -> Result<Self, StartupError> {
        let gate = RequestGate::new(&config.oauth, &config.gate).map_err(StartupError::Access)?;
        let login_url = config
            .oauth
            .login_url()
            .map_err(StartupError::Access)?
            .to_string();
        let transport = Transport::new(&config.api).map_err(StartupError::HttpClient)?;
        let identity = IdentityExchange::new(Arc::new(ServerRequestClient::new(transport)));

        Ok(Self::new(identity, gate, login_url, config.session))
    }
}

/// Errors that stop the server from starting.
#[derive(Debug)]
pub enum StartupError {
    /// OAuth or gate settings are unusable.
    Access(Report<ConfigurationError>),
    /// The outbound HTTP client could not be built.
    HttpClient(ApiError),
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access(report) => write!(f, "{}", report.current_context()),
            Self::HttpClient(err) => write!(f, "failed to create HTTP client: {err}"),
        }
    }
}

impl std::error::Error for StartupError {}

/// Routes under `/api/auth`.
pub fn routes<S>() -> Router<S>
where
    Arc<AppState>: FromRef<S>,
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/api/auth/login", get(login))
        .route("/api/auth/callback", get(callback))
        .route("/api/auth/verify", get(verify))
        .route("/api/auth/logout", get(logout))
}

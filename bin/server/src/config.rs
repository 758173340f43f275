//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`OAuthConfig`], [`GateConfig`] and [`ClientConfig`] for the settings
//! owned by the library crates.

use iugu_portal_api_client::ClientConfig;
use iugu_portal_platform_access::{GateConfig, OAuthConfig};
use serde::Deserialize;

/// Server configuration composed from library configs.
///
/// Every section has defaults so a missing variable is reported by the
/// component that needs it. OAuth settings in particular are validated when
/// the request gate is built.
#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    /// Identity provider settings (`OAUTH__*`).
    #[serde(default)]
    pub oauth: OAuthConfig,

    /// Remote API settings (`API__*`).
    #[serde(default)]
    pub api: ClientConfig,

    /// Session cookie settings (`SESSION__*`).
    #[serde(default)]
    pub session: SessionConfig,

    /// Request gate settings (`GATE__*`).
    #[serde(default)]
    pub gate: GateConfig,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie holding the access token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Cookie lifetime in days.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_cookie_name() -> String {
    "accessToken".to_string()
}

fn default_max_age_days() -> i64 {
    7
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            max_age_days: default_max_age_days(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

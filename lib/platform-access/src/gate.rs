//! Request gate decision logic.
//!
//! The gate runs in front of every page request. It is a pure function of the
//! path, the query string and whether a session cookie is present; the axum
//! middleware only gathers those inputs and turns the decision into a response.

use crate::error::ConfigurationError;
use crate::oauth::OAuthConfig;
use iugu_portal_core::Result;
use serde::{Deserialize, Serialize};

/// Gate settings.
///
/// List fields are comma-separated strings so they can be set from a single
/// environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Paths reachable without a session (prefix match).
    /// Default: "/forgot-password"
    #[serde(default = "default_public_paths")]
    public_paths: String,
    /// Path prefixes the gate never evaluates.
    /// Default: "/api,/pkg,/favicon.ico,/sitemap.xml,/robots.txt"
    #[serde(default = "default_excluded_prefixes")]
    excluded_prefixes: String,
    /// Where an authenticated request for `/` is sent.
    /// Default: "/dashboard"
    #[serde(default = "default_landing_path")]
    landing_path: String,
}

fn default_public_paths() -> String {
    "/forgot-password".to_string()
}

fn default_excluded_prefixes() -> String {
    "/api,/pkg,/favicon.ico,/sitemap.xml,/robots.txt".to_string()
}

fn default_landing_path() -> String {
    "/dashboard".to_string()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            public_paths: default_public_paths(),
            excluded_prefixes: default_excluded_prefixes(),
            landing_path: default_landing_path(),
        }
    }
}

impl GateConfig {
    /// Replaces the public paths.
    #[must_use]
    pub fn with_public_paths(mut self, paths: impl Into<String>) -> Self {
        self.public_paths = paths.into();
        self
    }

    /// Replaces the excluded prefixes.
    #[must_use]
    pub fn with_excluded_prefixes(mut self, prefixes: impl Into<String>) -> Self {
        self.excluded_prefixes = prefixes.into();
        self
    }

    /// Replaces the landing path.
    #[must_use]
    pub fn with_landing_path(mut self, path: impl Into<String>) -> Self {
        self.landing_path = path.into();
        self
    }

    /// Returns the public paths as a list.
    #[must_use]
    pub fn public_paths(&self) -> Vec<String> {
        split_list(&self.public_paths)
    }

    /// Returns the excluded prefixes as a list.
    #[must_use]
    pub fn excluded_prefixes(&self) -> Vec<String> {
        split_list(&self.excluded_prefixes)
    }

    /// Returns the landing path.
    #[must_use]
    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The path is outside the gate.
    Excluded,
    /// The provider redirect is in flight (`?code=` present).
    AuthorizationCode,
    /// The path is on the public allow-list.
    PublicPath,
    /// A session cookie is present.
    Authenticated,
    /// No session: send the browser to the provider.
    Login(String),
    /// Authenticated request for `/`: send it to the landing path.
    Landing(String),
}

impl GateDecision {
    /// Returns the redirect target, if the request must not pass.
    #[must_use]
    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            Self::Login(location) | Self::Landing(location) => Some(location),
            _ => None,
        }
    }
}

/// Decides, per request, whether to allow it or redirect.
#[derive(Debug, Clone)]
pub struct RequestGate {
    authorize_url: String,
    public_paths: Vec<String>,
    excluded_prefixes: Vec<String>,
    landing_path: String,
}

impl RequestGate {
    /// Builds the gate, resolving the authorize URL once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the OAuth settings cannot produce an
    /// authorize URL or the landing path is not an absolute path.
    pub fn new(
        oauth: &OAuthConfig,
        config: &GateConfig,
    ) -> Result<Self, ConfigurationError> {
        let authorize_url = oauth.authorization_url()?;

        let landing_path = config.landing_path().trim();
        if !landing_path.starts_with('/') {
            return Err(ConfigurationError::InvalidUrl {
                field: "gate.landing_path",
                reason: format!("'{landing_path}' is not an absolute path"),
            }
            .into());
        }

        Ok(Self {
            authorize_url: authorize_url.into(),
            public_paths: config.public_paths(),
            excluded_prefixes: config.excluded_prefixes(),
            landing_path: landing_path.to_string(),
        })
    }

    /// Returns the authorize URL unauthenticated requests are sent to.
    #[must_use]
    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    /// Returns the landing path.
    #[must_use]
    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    /// Returns true if the gate does not evaluate `path`.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Evaluates a request.
    ///
    /// `query` is the raw query string without the leading `?`.
    #[must_use]
    pub fn decide(&self, path: &str, query: Option<&str>, has_session: bool) -> GateDecision {
        if self.is_excluded(path) {
            return GateDecision::Excluded;
        }
        if query.is_some_and(has_code_param) {
            return GateDecision::AuthorizationCode;
        }
        if self
            .public_paths
            .iter()
            .any(|public| path.starts_with(public.as_str()))
        {
            return GateDecision::PublicPath;
        }
        if !has_session {
            return GateDecision::Login(self.authorize_url.clone());
        }
        if path == "/" {
            return GateDecision::Landing(self.landing_path.clone());
        }
        GateDecision::Authenticated
    }
}

fn has_code_param(query: &str) -> bool {
    url::form_urlencoded::parse(query.as_bytes()).any(|(key, _)| key == "code")
}

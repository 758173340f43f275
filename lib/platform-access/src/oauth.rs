//! OAuth configuration for the identity provider.
//!
//! The portal only runs the first leg of the authorization code flow: it sends
//! the browser to the provider's authorize endpoint and receives the code on
//! the callback route. The code exchange itself is done by the remote API.

use crate::error::ConfigurationError;
use oauth2::{AuthUrl, ClientId, RedirectUrl};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the identity provider's authorize endpoint.
///
/// Fields with defaults can be omitted when loading from environment variables.
/// `client_id` and `redirect_uri` default to empty and are rejected by
/// [`OAuthConfig::authorization_url`], so a missing variable fails at startup
/// rather than producing a broken redirect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// The OAuth2 client ID registered with the provider.
    #[serde(default)]
    client_id: String,
    /// Where the provider sends the browser back with `?code=`.
    #[serde(default)]
    redirect_uri: String,
    /// The provider authorize endpoint.
    /// Default: "https://identity.iugu.com/authorize"
    #[serde(default = "default_authorize_url")]
    authorize_url: String,
}

fn default_authorize_url() -> String {
    "https://identity.iugu.com/authorize".to_string()
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self::new(String::new(), String::new())
    }
}

impl OAuthConfig {
    /// Creates a configuration using the default authorize endpoint.
    #[must_use]
    pub fn new(client_id: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            redirect_uri,
            authorize_url: default_authorize_url(),
        }
    }

    /// Replaces the authorize endpoint.
    #[must_use]
    pub fn with_authorize_url(mut self, authorize_url: impl Into<String>) -> Self {
        self.authorize_url = authorize_url.into();
        self
    }

    /// Returns the client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the authorize endpoint.
    #[must_use]
    pub fn authorize_endpoint(&self) -> &str {
        &self.authorize_url
    }

    /// Builds the URL that starts a fresh sign-in.
    ///
    /// The provider is asked to re-authenticate (`max_age=0`, `prompt=login`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the client ID or redirect URI is
    /// empty, or when either URL does not parse.
    pub fn authorization_url(&self) -> Result<Url, Report<ConfigurationError>> {
        self.build_url(true)
    }

    /// Builds the authorize URL for the login page.
    ///
    /// Carries `max_age=0` but not `prompt=login`.
    ///
    /// # Errors
    ///
    /// Same as [`OAuthConfig::authorization_url`].
    pub fn login_url(&self) -> Result<Url, Report<ConfigurationError>> {
        self.build_url(false)
    }

    fn build_url(&self, force_login: bool) -> Result<Url, Report<ConfigurationError>> {
        let client_id = ClientId::new(required("oauth.client_id", &self.client_id)?);
        let redirect_uri = RedirectUrl::new(required("oauth.redirect_uri", &self.redirect_uri)?)
            .map_err(|e| ConfigurationError::InvalidUrl {
                field: "oauth.redirect_uri",
                reason: e.to_string(),
            })?;
        let auth_url = AuthUrl::new(required("oauth.authorize_url", &self.authorize_url)?)
            .map_err(|e| ConfigurationError::InvalidUrl {
                field: "oauth.authorize_url",
                reason: e.to_string(),
            })?;

        let mut url = auth_url.url().clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("client_id", client_id.as_str())
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", redirect_uri.as_str())
                .append_pair("max_age", "0");
            if force_login {
                pairs.append_pair("prompt", "login");
            }
        }
        Ok(url)
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ConfigurationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigurationError::MissingValue { field });
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OAuthConfig {
        OAuthConfig::new(
            "portal".to_string(),
            "http://localhost:3000/api/auth/callback".to_string(),
        )
    }

    #[test]
    fn authorization_url_carries_all_parameters() {
        let url = config().authorization_url().expect("valid config");

        assert_eq!(url.as_str().split('?').next(), Some("https://identity.iugu.com/authorize"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("client_id".to_string(), "portal".to_string()),
                ("response_type".to_string(), "code".to_string()),
                (
                    "redirect_uri".to_string(),
                    "http://localhost:3000/api/auth/callback".to_string()
                ),
                ("max_age".to_string(), "0".to_string()),
                ("prompt".to_string(), "login".to_string()),
            ]
        );
    }

    #[test]
    fn redirect_uri_is_url_encoded() {
        let url = config().authorization_url().expect("valid config");
        assert!(
            url.as_str()
                .contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fapi%2Fauth%2Fcallback")
        );
    }

    #[test]
    fn login_url_keeps_max_age_but_not_prompt() {
        let url = config().login_url().expect("valid config");
        assert!(!url.as_str().contains("prompt="));
        assert!(url.as_str().ends_with("&max_age=0"));
        assert!(url.as_str().contains("client_id=portal"));
    }

    #[test]
    fn missing_client_id_fails_closed() {
        let config = OAuthConfig::new(String::new(), "http://localhost/cb".to_string());
        let report = config.authorization_url().expect_err("no client id");
        assert_eq!(
            report.current_context(),
            &ConfigurationError::MissingValue {
                field: "oauth.client_id"
            }
        );
    }

    #[test]
    fn missing_redirect_uri_fails_closed() {
        let config = OAuthConfig::new("portal".to_string(), "  ".to_string());
        let report = config.authorization_url().expect_err("no redirect uri");
        assert_eq!(
            report.current_context(),
            &ConfigurationError::MissingValue {
                field: "oauth.redirect_uri"
            }
        );
    }

    #[test]
    fn unparsable_authorize_endpoint_fails_closed() {
        let config = config().with_authorize_url("not a url");
        let report = config.authorization_url().expect_err("bad endpoint");
        assert!(matches!(
            report.current_context(),
            ConfigurationError::InvalidUrl {
                field: "oauth.authorize_url",
                ..
            }
        ));
    }

    #[test]
    fn deserializes_with_default_endpoint() {
        let config: OAuthConfig = serde_json::from_str(
            r#"{"client_id": "portal", "redirect_uri": "http://localhost/cb"}"#,
        )
        .expect("deserialize");
        assert_eq!(config.authorize_endpoint(), "https://identity.iugu.com/authorize");
    }
}

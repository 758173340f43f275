//! Session cookie helpers and the shared permission check.

use super::AppState;
use crate::config::SessionConfig;
use crate::error::PermissionError;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use iugu_portal_api_client::RequestScope;
use iugu_portal_authz::PermissionResult;
use iugu_portal_core::Action;
use iugu_portal_platform_access::SessionToken;
use time::Duration;

/// Reads the session token from the request cookies.
pub fn session_token(jar: &CookieJar, config: &SessionConfig) -> Option<SessionToken> {
    jar.get(&config.cookie_name)
        .and_then(|cookie| SessionToken::from_cookie(cookie.value()))
}

/// Builds the cookie that stores a freshly issued access token.
pub fn session_cookie(config: &SessionConfig, access_token: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), access_token))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(config.max_age_days))
        .build()
}

/// Builds the cookie that clears the session.
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Creates the per-request scope, with the session token as ambient credential.
pub fn request_scope(token: Option<&SessionToken>) -> RequestScope {
    let bearer = token.map(|t| t.as_str().to_string());
    RequestScope::with_credentials(move || bearer.clone())
}

/// Verifies `actions` for the caller identified by the session cookie.
///
/// Used by both the REST verify route and the `check_permissions` server
/// function so they agree on every outcome.
pub async fn check_permissions(
    state: &AppState,
    jar: &CookieJar,
    actions: &[Action],
) -> Result<PermissionResult, PermissionError> {
    let token =
        session_token(jar, &state.session_config).ok_or(PermissionError::NotAuthenticated)?;
    let principal = token.principal().map_err(PermissionError::InvalidSession)?;

    let scope = request_scope(Some(&token));
    state
        .identity
        .verify(&scope, &principal, actions)
        .await
        .map_err(PermissionError::Verify)
}

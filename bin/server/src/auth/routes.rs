//! Authentication routes for login, callback, verify, and logout.

use super::AppState;
use super::session::{check_permissions, removal_cookie, request_scope, session_cookie};
use crate::error::PermissionError;
use axum::{
    Json,
    extract::{Query, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use iugu_portal_authz::{ExchangeError, PermissionResult};
use iugu_portal_core::Action;
use rootcause::prelude::Report;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Query parameters for the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
}

/// Redirects to the identity provider's sign-in page.
pub async fn login(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Redirect::temporary(&state.login_url)
}

/// Handles the OAuth callback after the user authenticates with the identity provider.
///
/// Trades the code for an access token, stores it in the session cookie and
/// sends the browser to the landing page.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or(AuthError::MissingCode)?;

    // No session exists yet; the exchange carries no credential.
    let scope = request_scope(None);
    let token = state
        .identity
        .exchange_code(&scope, &code)
        .await
        .map_err(AuthError::TokenExchange)?;

    tracing::info!(expires_in = token.expires_in, "user signed in");

    let jar = jar.add(session_cookie(&state.session_config, token.access_token));
    Ok((jar, Redirect::temporary(state.gate.landing_path())))
}

/// Verifies the `action` query parameters for the signed-in caller.
///
/// Responds with the action → bool mapping, or `{"allowed": false}` with 401
/// when there is no usable session.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    jar: CookieJar,
) -> Result<Json<PermissionResult>, PermissionError> {
    let actions = requested_actions(query.as_deref());
    let result = check_permissions(&state, &jar, &actions).await?;
    Ok(Json(result))
}

/// Logs out the user by clearing the session cookie.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(removal_cookie(&state.session_config)),
        Redirect::temporary("/"),
    )
}

/// Collects every `action` parameter, in order.
fn requested_actions(query: Option<&str>) -> Vec<Action> {
    query
        .map(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .filter(|(key, _)| key == "action")
                .map(|(_, value)| Action::new(value.into_owned()))
                .collect()
        })
        .unwrap_or_default()
}

/// Authentication errors.
#[derive(Debug)]
pub enum AuthError {
    MissingCode,
    TokenExchange(Report<ExchangeError>),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingCode => (StatusCode::BAD_REQUEST, "Iugu OAuth code was not found."),
            Self::TokenExchange(report) => {
                tracing::error!(error = %report.current_context(), "token exchange failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to authenticate with Iugu.",
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

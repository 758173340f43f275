//! Session server functions used by the UI.

use leptos::prelude::*;
use std::collections::BTreeMap;

/// Returns true when the request carries a session cookie.
#[server]
pub async fn is_authenticated() -> Result<bool, ServerFnError> {
    use crate::auth::{AppState, session::session_token};
    use axum::Extension;
    use axum_extra::extract::CookieJar;
    use std::sync::Arc;

    let jar: CookieJar = leptos_axum::extract().await?;
    let Extension(state): Extension<Arc<AppState>> = leptos_axum::extract().await?;

    Ok(session_token(&jar, &state.session_config).is_some())
}

/// Verifies `actions` for the signed-in caller.
///
/// Returns one entry per requested action. Failures are reported as a
/// user-safe error; the caller treats any error as "not allowed".
#[server]
pub async fn check_permissions(actions: Vec<String>) -> Result<BTreeMap<String, bool>, ServerFnError> {
    use crate::auth::AppState;
    use axum::Extension;
    use axum_extra::extract::CookieJar;
    use iugu_portal_core::Action;
    use std::sync::Arc;

    let jar: CookieJar = leptos_axum::extract().await?;
    let Extension(state): Extension<Arc<AppState>> = leptos_axum::extract().await?;

    let actions: Vec<Action> = actions.into_iter().map(Action::new).collect();
    let result = crate::auth::check_permissions(&state, &jar, &actions)
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "permission check failed");
            e.into_server_error()
        })?;

    Ok(result
        .iter()
        .map(|(action, allowed)| (action.to_string(), allowed))
        .collect())
}

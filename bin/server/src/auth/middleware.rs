//! Request gate middleware for Axum.

use super::AppState;
use super::session::session_token;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use iugu_portal_platform_access::GateDecision;
use std::sync::Arc;

/// Gates every request that is not under an excluded prefix.
///
/// Unauthenticated requests are sent to the identity provider; an
/// authenticated request for `/` is sent to the landing page. Redirects are
/// temporary (307).
pub async fn gate(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let decision = {
        let jar = CookieJar::from_headers(request.headers());
        let has_session = session_token(&jar, &state.session_config).is_some();
        let uri = request.uri();
        state.gate.decide(uri.path(), uri.query(), has_session)
    };

    if decision == GateDecision::Excluded {
        return next.run(request).await;
    }

    match decision.redirect_location() {
        Some(location) => {
            tracing::debug!(
                path = %request.uri().path(),
                decision = ?decision,
                "redirecting gated request"
            );
            Redirect::temporary(location).into_response()
        }
        None => next.run(request).await,
    }
}

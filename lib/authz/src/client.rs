//! Identity provider calls made through the request client.

use crate::error::ExchangeError;
use crate::types::{PermissionResult, TokenResponse};
use iugu_portal_api_client::{ApiRequest, RequestClient, RequestScope};
use iugu_portal_core::{Action, Principal};
use rootcause::prelude::Report;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Endpoint that trades an authorization code for an access token.
pub const EXCHANGE_ENDPOINT: &str = "/auth/iugu";

/// Endpoint that verifies actions for a principal.
pub const VERIFY_ENDPOINT: &str = "/auth/verify";

/// Client for the identity provider's exchange and verify endpoints.
#[derive(Clone)]
pub struct IdentityExchange {
    client: Arc<dyn RequestClient>,
}

impl IdentityExchange {
    /// Creates an identity exchange over the given request client.
    pub fn new(client: Arc<dyn RequestClient>) -> Self {
        Self { client }
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// The code is forwarded exactly as received from the provider redirect.
    #[instrument(skip_all)]
    pub async fn exchange_code(
        &self,
        scope: &RequestScope,
        code: &str,
    ) -> Result<TokenResponse, Report<ExchangeError>> {
        let request = ApiRequest::post(EXCHANGE_ENDPOINT).json(json!({ "code": code }));

        let token: TokenResponse = self
            .client
            .send(scope, request)
            .await
            .map_err(ExchangeError::Request)?
            .json()
            .map_err(|e| ExchangeError::InvalidResponse { details: e.message })?;

        if token.access_token.is_empty() {
            warn!("code exchange response has no access token");
            return Err(ExchangeError::MissingAccessToken.into());
        }

        debug!(
            token_type = %token.token_type,
            expires_in = token.expires_in,
            "authorization code exchanged"
        );
        Ok(token)
    }

    /// Verifies `actions` for `principal`.
    ///
    /// The remote verifier must answer with a boolean for every requested
    /// action; a partial answer is an error, not a partial result.
    #[instrument(skip_all, fields(principal = %principal, actions = actions.len()))]
    pub async fn verify(
        &self,
        scope: &RequestScope,
        principal: &Principal,
        actions: &[Action],
    ) -> Result<PermissionResult, Report<ExchangeError>> {
        let request = ApiRequest::post(VERIFY_ENDPOINT).json(json!({
            "principals": principal,
            "actions": actions,
        }));

        let body: Map<String, Value> = self
            .client
            .send(scope, request)
            .await
            .map_err(ExchangeError::Request)?
            .json()
            .map_err(|e| ExchangeError::InvalidResponse { details: e.message })?;

        let result = PermissionResult::from_response(actions, &body).inspect_err(|e| {
            warn!(error = %e, "verify response is incomplete");
        })?;

        debug!(allowed = result.allows_all(actions), "permissions verified");
        Ok(result)
    }
}

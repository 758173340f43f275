//! Session token decoding.
//!
//! The session is the provider's bearer token, stored verbatim in an
//! HTTP-only cookie. Its payload is read to learn who the caller is; the
//! signature is not verified here, since the remote verifier checks the token
//! on every permission call.

use crate::error::AuthenticationError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use iugu_portal_core::Principal;
use iugu_portal_core::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Claims the portal reads from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The subject, used as the principal in permission checks.
    #[serde(default)]
    pub sub: String,
    /// Expiry as a Unix timestamp, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// The bearer token held in the session cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Reads the token from a cookie value. Empty values are no session.
    #[must_use]
    pub fn from_cookie(value: &str) -> Option<Self> {
        if value.is_empty() {
            None
        } else {
            Some(Self::new(value))
        }
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decodes the payload segment into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError::InvalidToken`] if the token does not have
    /// three segments, or the payload is not base64url-encoded JSON matching `T`.
    pub fn decode_claims<T: DeserializeOwned>(&self) -> Result<T, AuthenticationError> {
        let mut segments = self.0.split('.');
        let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => {
                return Err(AuthenticationError::invalid("expected 3 segments").into());
            }
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| AuthenticationError::invalid(format!("payload is not base64url: {e}")))?;

        let claims = serde_json::from_slice(&bytes)
            .map_err(|e| AuthenticationError::invalid(format!("payload is not valid JSON: {e}")))?;
        Ok(claims)
    }

    /// Returns the principal named by the `sub` claim.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError::InvalidToken`] for an undecodable token or
    /// one whose `sub` is absent or empty.
    pub fn principal(&self) -> Result<Principal, AuthenticationError> {
        let claims: SessionClaims = self.decode_claims()?;
        if claims.sub.trim().is_empty() {
            return Err(AuthenticationError::invalid("missing required claim: sub").into());
        }
        Ok(Principal::new(claims.sub))
    }
}

// The token is a credential; keep it out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

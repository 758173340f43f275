//! Response types of the identity provider.

use crate::error::ExchangeError;
use iugu_portal_core::Action;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Result of trading an authorization code for a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The bearer token stored in the session cookie.
    #[serde(default)]
    pub access_token: String,
    /// Token type, normally "Bearer".
    #[serde(default)]
    pub token_type: String,
    /// Lifetime of the token in seconds.
    #[serde(default)]
    pub expires_in: u64,
    /// Granted scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Per-action verification result, one entry per requested action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionResult(BTreeMap<Action, bool>);

impl PermissionResult {
    /// Validates a raw verify response against the requested actions.
    ///
    /// Every requested action must map to a boolean. Entries for actions that
    /// were not requested are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::MissingAction`] for the first requested action
    /// without a boolean entry.
    pub fn from_response(
        actions: &[Action],
        response: &Map<String, Value>,
    ) -> Result<Self, ExchangeError> {
        let mut result = BTreeMap::new();
        for action in actions {
            let allowed = response
                .get(action.as_str())
                .and_then(Value::as_bool)
                .ok_or_else(|| ExchangeError::MissingAction {
                    action: action.clone(),
                })?;
            result.insert(action.clone(), allowed);
        }
        Ok(Self(result))
    }

    /// Returns the result for `action`, if it was requested.
    #[must_use]
    pub fn get(&self, action: &Action) -> Option<bool> {
        self.0.get(action).copied()
    }

    /// Returns true iff every action in `actions` resolved to true.
    #[must_use]
    pub fn allows_all(&self, actions: &[Action]) -> bool {
        actions.iter().all(|action| self.get(action) == Some(true))
    }

    /// Iterates over the entries in action order.
    pub fn iter(&self) -> impl Iterator<Item = (&Action, bool)> {
        self.0.iter().map(|(action, allowed)| (action, *allowed))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no actions were requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Action, bool)> for PermissionResult {
    fn from_iter<I: IntoIterator<Item = (Action, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

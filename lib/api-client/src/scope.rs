//! Per-request context for outbound calls.
//!
//! A [`RequestScope`] lives exactly as long as the incoming request being
//! handled. It memoizes identical outbound calls and carries the fallback
//! credential used when a call does not set one explicitly.

use crate::error::ApiError;
use crate::request::{Method, ResponseType};
use crate::response::ApiResponse;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};

pub(crate) type Outcome = Result<ApiResponse, ApiError>;

/// Supplies the ambient bearer credential for a scope.
pub trait CredentialResolver: Send + Sync {
    /// Returns the bearer token to attach, if any.
    fn bearer_token(&self) -> Option<String>;
}

impl<F> CredentialResolver for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn bearer_token(&self) -> Option<String> {
        self()
    }
}

/// Identity of a memoizable call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MemoKey {
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
    /// Extra headers with lowercased names, sorted.
    pub headers: Vec<(String, String)>,
    pub credential: Option<String>,
    pub timeout: Option<Duration>,
    pub response_type: ResponseType,
}

impl MemoKey {
    /// Normalizes extra headers so their order and name casing do not matter.
    pub(crate) fn normalize_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
        let mut normalized: Vec<_> = headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
            .collect();
        normalized.sort();
        normalized
    }
}

#[derive(Default)]
struct MemoTable {
    entries: HashMap<MemoKey, Arc<OnceCell<Outcome>>>,
    tags: HashMap<String, HashSet<MemoKey>>,
}

/// Request-scoped memoization cache and credential context.
#[derive(Default)]
pub struct RequestScope {
    credentials: Option<Arc<dyn CredentialResolver>>,
    table: Mutex<MemoTable>,
}

impl RequestScope {
    /// Creates an empty scope without an ambient credential.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope whose calls fall back to `resolver` for their credential.
    #[must_use]
    pub fn with_credentials(resolver: impl CredentialResolver + 'static) -> Self {
        Self {
            credentials: Some(Arc::new(resolver)),
            table: Mutex::default(),
        }
    }

    /// Resolves the credential for a call: the explicit one wins.
    pub(crate) fn credential_for(&self, explicit: Option<String>) -> Option<String> {
        explicit.or_else(|| {
            self.credentials
                .as_ref()
                .and_then(|resolver| resolver.bearer_token())
        })
    }

    /// Runs `call` unless an identical call already ran (or is running) in this scope.
    pub(crate) async fn memoized<F, Fut>(&self, key: MemoKey, tags: &[String], call: F) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        let cell = {
            let mut table = self.table.lock().await;
            for tag in tags {
                table
                    .tags
                    .entry(tag.clone())
                    .or_default()
                    .insert(key.clone());
            }
            table.entries.entry(key).or_default().clone()
        };

        cell.get_or_init(call).await.clone()
    }

    /// Drops every memoized call registered under `tag`. Returns how many were dropped.
    pub async fn invalidate_tag(&self, tag: &str) -> usize {
        let mut table = self.table.lock().await;
        let Some(keys) = table.tags.remove(tag) else {
            return 0;
        };
        let dropped = keys
            .iter()
            .filter(|key| table.entries.remove(*key).is_some())
            .count();

        table.tags.retain(|_, tagged| {
            tagged.retain(|key| !keys.contains(key));
            !tagged.is_empty()
        });

        dropped
    }

    #[cfg(test)]
    async fn tagged_calls(&self, tag: &str) -> usize {
        self.table
            .lock()
            .await
            .tags
            .get(tag)
            .map_or(0, HashSet::len)
    }

    /// Number of memoized calls currently held.
    pub async fn memoized_calls(&self) -> usize {
        self.table.lock().await.entries.len()
    }
}

impl fmt::Debug for RequestScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestScope")
            .field("has_credentials", &self.credentials.is_some())
            .finish_non_exhaustive()
    }
}

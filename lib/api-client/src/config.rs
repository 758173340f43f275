//! Request client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the outbound request client.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every endpoint is resolved against.
    /// Default: "http://localhost:3333/api"
    #[serde(default = "default_base_url")]
    base_url: String,
    /// Timeout applied to calls that do not set their own, in milliseconds.
    #[serde(default)]
    timeout_ms: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:3333/api".to_string()
}

impl ClientConfig {
    /// Creates a configuration for the given base URL with no default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: None,
        }
    }

    /// Sets the default timeout in milliseconds.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the default timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(default_base_url())
    }
}

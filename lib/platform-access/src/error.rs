//! Error types for the platform-access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `AuthenticationError`: the session token could not be read
//! - `ConfigurationError`: OAuth or gate settings are unusable

use std::fmt;

/// Errors from reading a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// The token is not a decodable JWT or lacks a subject.
    InvalidToken { reason: String },
}

impl AuthenticationError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken { reason } => {
                write!(f, "invalid token: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthenticationError {}

/// Errors from validating access configuration at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A required setting is empty or absent.
    MissingValue { field: &'static str },
    /// A setting that must be a URL or path does not parse as one.
    InvalidUrl { field: &'static str, reason: String },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingValue { field } => {
                write!(f, "missing required configuration: {field}")
            }
            Self::InvalidUrl { field, reason } => {
                write!(f, "invalid URL in {field}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

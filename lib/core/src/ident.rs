//! Strongly-typed names exchanged with the remote verifier.
//!
//! Both types wrap an opaque, non-empty string. The portal never interprets
//! them; they are forwarded verbatim to the identity provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an identifier from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdentError {
    /// The type of identifier that failed to parse.
    pub ident_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.ident_type, self.reason)
    }
}

impl std::error::Error for ParseIdentError {}

/// Macro to generate an opaque string identifier.
macro_rules! define_ident {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates the identifier from any string-like value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier, returning the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdentError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.trim().is_empty() {
                    return Err(ParseIdentError {
                        ident_type: stringify!($name),
                        reason: "value is empty".to_string(),
                    });
                }
                Ok(Self(s.to_string()))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_ident!(
    /// The subject of a session token, used as the actor in permission checks.
    Principal
);

define_ident!(
    /// A requested capability such as `"dashboard:view"`.
    Action
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_displays_raw_value() {
        let principal = Principal::new("app:01HXYZ");
        assert_eq!(principal.to_string(), "app:01HXYZ");
        assert_eq!(principal.as_str(), "app:01HXYZ");
    }

    #[test]
    fn action_rejects_blank_input() {
        let err = Action::from_str("   ").expect_err("blank action");
        assert_eq!(err.ident_type, "Action");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn action_parses_verbatim() {
        let action: Action = "pix:cob.write".parse().expect("parse");
        assert_eq!(action.as_str(), "pix:cob.write");
    }

    #[test]
    fn action_serializes_as_plain_string() {
        let action = Action::new("dashboard:view");
        let json = serde_json::to_string(&action).expect("serialize");
        assert_eq!(json, "\"dashboard:view\"");
    }
}

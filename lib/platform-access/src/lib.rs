//! Platform access for iugu-portal.
//!
//! This crate provides:
//! - OAuth configuration and the provider authorize URL (`OAuthConfig`)
//! - Session token decoding (`SessionToken`)
//! - The request gate deciding, per request, whether to allow or redirect
//!   (`RequestGate`, `GateDecision`)
//!
//! # Access Model
//!
//! A request is authenticated iff the session cookie is present. The token is
//! decoded only to read its subject when permissions are verified; its
//! signature is never checked here. Capability checks are delegated to the
//! identity provider's verify endpoint.
//!
//! # Example
//!
//! ```
//! use iugu_portal_platform_access::{GateConfig, GateDecision, OAuthConfig, RequestGate};
//!
//! let oauth = OAuthConfig::new(
//!     "client-id".to_string(),
//!     "http://localhost:3000/api/auth/callback".to_string(),
//! );
//! let gate = RequestGate::new(&oauth, &GateConfig::default()).expect("valid config");
//!
//! assert!(matches!(gate.decide("/dashboard", None, false), GateDecision::Login(_)));
//! assert_eq!(gate.decide("/dashboard", None, true), GateDecision::Authenticated);
//! assert_eq!(
//!     gate.decide("/", None, true),
//!     GateDecision::Landing("/dashboard".to_string())
//! );
//! ```

pub mod error;
pub mod gate;
pub mod oauth;
pub mod session;

// Re-export main types at crate root
pub use error::{AuthenticationError, ConfigurationError};
pub use gate::{GateConfig, GateDecision, RequestGate};
pub use oauth::OAuthConfig;
pub use session::{SessionClaims, SessionToken};

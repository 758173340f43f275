//! Identity exchange for iugu-portal.
//!
//! This crate wraps the outbound request client to perform the two calls the
//! portal makes to the identity provider: trading an OAuth authorization code
//! for an access token, and verifying which actions a principal may perform.

mod client;
mod error;
mod types;

pub use client::{EXCHANGE_ENDPOINT, IdentityExchange, VERIFY_ENDPOINT};
pub use error::ExchangeError;
pub use types::{PermissionResult, TokenResponse};

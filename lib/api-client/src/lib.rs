//! Outbound request client for the iugu identity provider.
//!
//! Every call to the remote provider goes through a [`RequestClient`]:
//! - the endpoint is resolved against the configured base URL
//! - a bearer credential is attached, either explicit or resolved from the
//!   [`RequestScope`]
//! - identical calls within one scope are memoized
//! - failures are normalized into [`ApiError`]
//!
//! Two implementations share the same transport. [`ServerRequestClient`]
//! invalidates cache tags after successful writes; [`BrowserRequestClient`]
//! never does.

mod client;
mod config;
mod error;
mod request;
mod response;
mod scope;

pub use client::{BrowserRequestClient, RequestClient, ServerRequestClient, Transport};
pub use config::ClientConfig;
pub use error::ApiError;
pub use request::{ApiRequest, Method, RequestBody, ResponseType};
pub use response::ApiResponse;
pub use scope::{CredentialResolver, RequestScope};

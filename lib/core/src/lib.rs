//! Core domain types and utilities for iugu-portal.
//!
//! This crate provides the foundational types shared by the request client,
//! the identity exchange, and the web server: the rootcause-based `Result`
//! alias and the identity/capability names passed to the remote verifier.

pub mod error;
pub mod ident;

pub use error::Result;
pub use ident::{Action, ParseIdentError, Principal};

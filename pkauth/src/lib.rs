//! # pkauth
//!
//! A rust library that implements the server side of HTTP Digest
//! Authentication (RFC 2617, MD5 with `qop="auth"`).
//!
//! The entry point is the [`DigestGate`]: it challenges unauthenticated
//! callers, parses and validates `Authorization: Digest` values, and hands
//! the authenticated username back to the calling HTTP layer. Every failure
//! is a typed [`AuthError`] which the HTTP layer renders as a `401` response
//! with the fixed wire body; the gate never terminates anything itself.
//!
//! Validation is stateless: nothing is stored between requests, every
//! request re-authenticates from scratch and nonces are not tracked after
//! emission. A captured response can therefore be replayed; front the gate
//! with a single-use nonce store if that matters for your deployment.

pub mod auth;
pub mod digest;
pub mod gate;
pub mod headers;
pub mod parser;
pub mod secret;

pub(crate) mod error;

pub use auth::{DigestChallenge, DigestCredential};
pub use error::AuthError;
pub use error::Result;
pub use gate::{CredentialStore, DigestGate, DigestGateBuilder};
pub use headers::Body;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

//! Identity verification.
//!
//! - [`TokenVerifier`] -- resolves a bearer token to a user id.
//! - [`firebase::FirebaseTokenVerifier`] -- verifies Firebase ID tokens
//!   against Google's published signing keys.

pub mod firebase;

use async_trait::async_trait;
use scrollstop_core::types::UserId;

/// Errors from token verification. Callers collapse every variant into a
/// single 401; the detail is for logs only.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token rejected: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Token header has no key id")]
    MissingKeyId,

    #[error("Unknown signing key: {0}")]
    UnknownKey(String),

    #[error("Unsupported token algorithm: {0:?}")]
    UnsupportedAlgorithm(jsonwebtoken::Algorithm),

    #[error("Token has no subject")]
    MissingSubject,

    #[error("Signing key request failed: {0}")]
    KeyFetch(#[from] reqwest::Error),

    #[error("Signing key endpoint returned {0}")]
    KeyEndpoint(u16),
}

/// Resolves a bearer token to the id of the user it was issued to.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}

//! Error types for the login flow.

use thiserror::Error;

/// Errors produced by the authorization code grant and its helpers.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A bearer token could not be decoded into claims.
    #[error("malformed bearer token")]
    MalformedToken,

    /// The provider's discovery document could not be fetched or parsed.
    #[error("provider discovery failed for {url}: {reason}")]
    Discovery { url: String, reason: String },

    /// The redirect carried a `state` value this attempt never issued.
    #[error("state parameter did not match the login attempt")]
    InvalidState,

    /// The provider rejected the authorization code, or the token
    /// response was unusable.
    #[error("authorization code exchange failed: {0}")]
    ExchangeFailed(String),

    /// The ID token's signature or claims did not verify against the
    /// realm's published keys.
    #[error("ID token verification failed: {0}")]
    VerificationFailed(String),

    /// No redirect arrived before the attempt deadline.
    #[error("no login redirect arrived within {0} seconds")]
    Timeout(u64),

    /// The login was interrupted before it completed.
    #[error("login cancelled")]
    Cancelled,

    /// The loopback listener could not be bound or served.
    #[error("callback listener error: {0}")]
    Listener(#[from] std::io::Error),
}

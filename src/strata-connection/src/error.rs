//! Error types for strata-connection.

use thiserror::Error;

use strata_config::ConfigError;
use strata_login::{AuthError, Realm};

/// Errors produced while building or using a connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The realm holds no tokens at all; the caller must log in first.
    #[error("not logged in for the {0} realm, run 'strata login'")]
    Unauthenticated(Realm),

    /// The provider rejected the refresh token, or the refresh request
    /// failed in transit.
    #[error("failed to refresh {realm} tokens: {reason}")]
    RefreshFailed { realm: Realm, reason: String },

    /// The provider's end-session call failed; local tokens were kept.
    #[error("logout failed: {0}")]
    LogoutFailed(String),

    /// An API endpoint answered with a non-success status.
    #[error("API request failed: HTTP {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Transport-level failure talking to the platform.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider discovery failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Persisting refreshed tokens failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A builder input URL did not parse.
    #[error("invalid {name} URL '{value}': {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// The builder was given no client ID.
    #[error("client ID is not set")]
    MissingClientId,
}

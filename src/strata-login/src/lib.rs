//! Interactive SSO login for the Strata CLI.
//!
//! Implements the OAuth2 authorization code grant against the platform's
//! two identity realms: the primary provider that guards the management
//! API, and the secondary realm used by per-instance admin endpoints.
//! A transient HTTP listener on a loopback port receives the provider
//! redirect, exchanges the code, verifies the returned ID token against
//! the realm's published keys, and hands the token pair back to the
//! orchestrator.
//!
//! The non-interactive path (`bootstrap_offline_token`) seeds a long-lived
//! offline token instead of running the browser flow.

mod attempt;
mod browser;
mod error;
mod grant;
mod provider;
pub mod token;

pub use attempt::{RealmAttempt, RealmConfig, RealmLogin, RunningAttempt};
pub use browser::open_in_browser;
pub use error::AuthError;
pub use grant::{
    AuthorizationCodeGrant, DEFAULT_ATTEMPT_TIMEOUT, Realm, bootstrap_offline_token,
    browser_presenter,
};
pub use provider::{
    IdTokenClaims, Jwk, JwkSet, ProviderMetadata, TokenResponse, discover, fetch_jwks,
    verify_id_token,
};

//! Authenticated access to the Strata platform APIs.
//!
//! A [`Connection`] wraps the credential state for both SSO realms and
//! hands out typed API clients whose access tokens are current. It is
//! assembled once per CLI invocation through the [`ConnectionBuilder`],
//! which performs a single best-effort token refresh so commands start
//! with valid credentials.

pub mod api;
mod builder;
mod connection;
mod error;

pub use builder::{BuildOutcome, ConnectionBuilder};
pub use connection::{Connection, ConnectionProfile};
pub use error::ConnectionError;

/// User-Agent string for all platform requests.
pub const USER_AGENT: &str = concat!("strata-cli/", env!("CARGO_PKG_VERSION"));

//! Persisted configuration for the Strata CLI.
//!
//! The config file holds everything a later invocation needs to talk to the
//! platform again: the token pairs for both SSO realms, the provider
//! endpoints they came from, and the per-service context, when one has
//! been selected.

mod error;
mod store;
mod types;

pub use error::ConfigError;
pub use store::{ConfigStore, FileConfigStore, config_path};
pub use types::{Config, RegistryConfig, StreamsConfig, TokenPair};

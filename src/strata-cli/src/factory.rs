//! Connection construction from the persisted config.

use std::sync::Arc;

use anyhow::Context;

use strata_config::{ConfigStore, FileConfigStore};
use strata_connection::{BuildOutcome, Connection, ConnectionBuilder, ConnectionProfile};

use crate::defaults;

/// Open the config store at its default location.
pub fn config_store() -> anyhow::Result<Arc<FileConfigStore>> {
    Ok(Arc::new(FileConfigStore::from_default_path()?))
}

/// Build a connection from the persisted config.
///
/// Performs the builder's single token-refresh pass; the outcome carries
/// any refresh error for the caller to judge.
pub async fn build_connection(
    store: Arc<FileConfigStore>,
    profile: ConnectionProfile,
) -> anyhow::Result<BuildOutcome> {
    let config = store.load()?;

    let api_url = or_default(&config.api_url, defaults::PRODUCTION_API_URL);
    let auth_url = or_default(&config.auth_url, defaults::PRODUCTION_AUTH_URL);
    let secondary_auth_url = or_default(
        &config.secondary_auth_url,
        defaults::PRODUCTION_SECONDARY_AUTH_URL,
    );
    let client_id = or_default(&config.client_id, defaults::CLIENT_ID);
    let scopes = if config.scopes.is_empty() {
        defaults::DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
    } else {
        config.scopes.clone()
    };

    let outcome = ConnectionBuilder::new()
        .with_access_token(config.tokens.access_token.clone())
        .with_refresh_token(config.tokens.refresh_token.clone())
        .with_secondary_access_token(config.secondary_tokens.access_token.clone())
        .with_secondary_refresh_token(config.secondary_tokens.refresh_token.clone())
        .with_api_url(api_url)
        .with_auth_url(auth_url)
        .with_secondary_auth_url(secondary_auth_url)
        .with_client_id(client_id)
        .with_scopes(scopes)
        .with_insecure(config.insecure)
        .with_profile(profile)
        // Surface transport-level detail under `--verbose`.
        .with_transport_wrapper(|client| client.connection_verbose(true))
        .with_config_store(store)
        .build()
        .await?;

    Ok(outcome)
}

/// Unwrap a build outcome for commands that need current tokens: a
/// failed refresh means the stored session is no longer usable.
pub fn require_fresh_tokens(outcome: BuildOutcome) -> anyhow::Result<Connection> {
    if let Some(err) = outcome.refresh_error {
        return Err(anyhow::Error::new(err)
            .context("could not refresh the stored session, run 'strata login' again"));
    }
    Ok(outcome.connection)
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Load the config, failing with a login hint when required.
pub fn load_config(store: &Arc<FileConfigStore>) -> anyhow::Result<strata_config::Config> {
    store.load().context("could not read the config file")
}

//! Typed clients for the platform APIs.
//!
//! Hand-written stand-ins for generated REST bindings, covering the
//! endpoints the CLI commands use. Management-plane clients carry the
//! primary access token; the per-instance admin client carries the
//! secondary one.

mod instance;
mod registry;
mod streams;

pub use instance::{InstanceAdminClient, Topic};
pub use registry::{RegistryClient, RegistryInstance};
pub use streams::{StreamInstance, StreamsClient};

use url::Url;

use strata_login::Realm;

use crate::error::ConnectionError;

/// The API surface handed out by `Connection::api()`.
///
/// Construction is free of network I/O; each client checks its token
/// before the first request and fails fast when the realm is not
/// authenticated.
pub struct ApiClientSet {
    http: reqwest::Client,
    api_url: Url,
    primary_token: String,
    secondary_token: String,
}

impl ApiClientSet {
    pub(crate) fn new(
        http: reqwest::Client,
        api_url: Url,
        primary_token: String,
        secondary_token: String,
    ) -> Self {
        Self {
            http,
            api_url,
            primary_token,
            secondary_token,
        }
    }

    /// Management client for stream instances.
    pub fn streams(&self) -> StreamsClient {
        StreamsClient::new(
            self.http.clone(),
            self.api_url.clone(),
            self.primary_token.clone(),
        )
    }

    /// Management client for registry instances.
    pub fn registry(&self) -> RegistryClient {
        RegistryClient::new(
            self.http.clone(),
            self.api_url.clone(),
            self.primary_token.clone(),
        )
    }

    /// Admin client for one service instance, addressed by the
    /// instance's own API URL. Authenticates with the secondary realm.
    pub fn instance_admin(&self, base_url: Url) -> InstanceAdminClient {
        InstanceAdminClient::new(self.http.clone(), base_url, self.secondary_token.clone())
    }
}

/// Shared request helper: bearer-authenticated GET with fail-fast on a
/// missing token and uniform status handling.
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    http: &reqwest::Client,
    url: Url,
    token: &str,
    realm: Realm,
) -> Result<T, ConnectionError> {
    if token.is_empty() {
        return Err(ConnectionError::Unauthenticated(realm));
    }

    let response = http.get(url).bearer_auth(token).send().await?;
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ConnectionError::Api { status, body });
    }

    Ok(response.json().await?)
}

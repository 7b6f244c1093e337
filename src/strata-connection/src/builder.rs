//! Builder assembling a [`Connection`] from configuration and flags.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use strata_config::{ConfigStore, TokenPair};

use crate::USER_AGENT;
use crate::connection::{Connection, ConnectionProfile, RealmSession};
use crate::error::ConnectionError;

/// Hook for adjusting the HTTP client before it is built, e.g. to add
/// instrumentation or a proxy. Applied after the builder's own settings.
pub type ClientCustomizer = Box<dyn Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of [`ConnectionBuilder::build`].
///
/// Construction succeeds even when the initial token refresh does not:
/// the refresh error is carried alongside the usable connection so the
/// caller decides whether its command can proceed without that realm.
pub struct BuildOutcome {
    pub connection: Connection,
    pub refresh_error: Option<ConnectionError>,
}

impl std::fmt::Debug for BuildOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildOutcome")
            .field("refresh_error", &self.refresh_error)
            .finish_non_exhaustive()
    }
}

/// Accumulates connection settings before a single `build()` call.
/// Nothing touches the network until then.
#[derive(Default)]
pub struct ConnectionBuilder {
    tokens: TokenPair,
    secondary_tokens: TokenPair,
    api_url: Option<String>,
    auth_url: Option<String>,
    secondary_auth_url: Option<String>,
    client_id: Option<String>,
    scopes: Vec<String>,
    insecure: bool,
    profile: ConnectionProfile,
    customizer: Option<ClientCustomizer>,
    store: Option<Arc<dyn ConfigStore>>,
}

impl ConnectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.tokens.access_token = token.into();
        self
    }

    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.tokens.refresh_token = token.into();
        self
    }

    pub fn with_secondary_access_token(mut self, token: impl Into<String>) -> Self {
        self.secondary_tokens.access_token = token.into();
        self
    }

    pub fn with_secondary_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.secondary_tokens.refresh_token = token.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = Some(url.into());
        self
    }

    pub fn with_secondary_auth_url(mut self, url: impl Into<String>) -> Self {
        self.secondary_auth_url = Some(url.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = String>) -> Self {
        self.scopes = scopes.into_iter().collect();
        self
    }

    /// Disable TLS verification on every client this connection builds.
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_profile(mut self, profile: ConnectionProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Install a transport hook, e.g. for request logging.
    pub fn with_transport_wrapper(
        mut self,
        customizer: impl Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync + 'static,
    ) -> Self {
        self.customizer = Some(Box::new(customizer));
        self
    }

    /// Attach the config store refreshed tokens are persisted through.
    pub fn with_config_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Assemble the connection and run one best-effort token refresh so
    /// its access tokens are current at hand-off.
    pub async fn build(self) -> Result<BuildOutcome, ConnectionError> {
        let api_url = parse_url("API", self.api_url.as_deref())?;
        let auth_url = parse_url("auth", self.auth_url.as_deref())?;
        let secondary_auth_url = parse_url("secondary auth", self.secondary_auth_url.as_deref())?;

        let client_id = match self.client_id {
            Some(client_id) if !client_id.is_empty() => client_id,
            _ => return Err(ConnectionError::MissingClientId),
        };

        let mut client_builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT);
        if self.insecure {
            tracing::warn!("TLS certificate verification is disabled");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }
        if let Some(customizer) = &self.customizer {
            client_builder = customizer(client_builder);
        }
        let http = client_builder.build()?;

        let mut connection = Connection {
            http,
            api_url,
            client_id,
            scopes: self.scopes,
            profile: self.profile,
            primary: RealmSession::new(auth_url, self.tokens),
            secondary: RealmSession::new(secondary_auth_url, self.secondary_tokens),
            store: self.store,
        };

        // Fail fast before any network I/O when a required realm holds
        // no tokens at all.
        connection.ensure_authenticated()?;

        let refresh_error = connection.refresh_tokens().await.err();
        if let Some(err) = &refresh_error {
            tracing::warn!(error = %err, "initial token refresh failed");
        }

        Ok(BuildOutcome {
            connection,
            refresh_error,
        })
    }
}

fn parse_url(name: &'static str, value: Option<&str>) -> Result<Url, ConnectionError> {
    let value = value.unwrap_or_default();
    Url::parse(value).map_err(|err| ConnectionError::InvalidUrl {
        name,
        value: value.to_string(),
        reason: err.to_string(),
    })
}

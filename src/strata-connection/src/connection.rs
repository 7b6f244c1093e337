//! The connection: credential state for both realms plus the API surface.

use std::sync::Arc;

use url::Url;

use strata_config::{ConfigStore, TokenPair};
use strata_login::{ProviderMetadata, Realm, TokenResponse, discover};

use crate::api::ApiClientSet;
use crate::error::ConnectionError;

/// Which realms a command requires tokens for.
///
/// Management-plane commands need only the primary realm; commands that
/// reach into a service instance also need the secondary realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionProfile {
    /// Primary-realm tokens must be present.
    pub require_auth: bool,
    /// Secondary-realm tokens must be present.
    pub require_secondary_auth: bool,
}

impl ConnectionProfile {
    /// Both realms required (instance-level commands).
    pub const DEFAULT: ConnectionProfile = ConnectionProfile {
        require_auth: true,
        require_secondary_auth: true,
    };

    /// Only the primary realm required (management-plane commands,
    /// logout, whoami, offline-token login).
    pub const SKIP_SECONDARY_AUTH: ConnectionProfile = ConnectionProfile {
        require_auth: true,
        require_secondary_auth: false,
    };
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        ConnectionProfile::DEFAULT
    }
}

/// Credential state for one realm, with its discovery document cached
/// after first use.
pub(crate) struct RealmSession {
    pub(crate) auth_url: Url,
    pub(crate) tokens: TokenPair,
    metadata: Option<ProviderMetadata>,
}

impl RealmSession {
    pub(crate) fn new(auth_url: Url, tokens: TokenPair) -> Self {
        Self {
            auth_url,
            tokens,
            metadata: None,
        }
    }

    async fn metadata(
        &mut self,
        http: &reqwest::Client,
    ) -> Result<ProviderMetadata, ConnectionError> {
        if let Some(metadata) = &self.metadata {
            return Ok(metadata.clone());
        }
        let metadata = discover(http, &self.auth_url).await?;
        self.metadata = Some(metadata.clone());
        Ok(metadata)
    }
}

/// An authenticated connection to the platform, owned by the invoking
/// command for the lifetime of the process.
pub struct Connection {
    pub(crate) http: reqwest::Client,
    pub(crate) api_url: Url,
    pub(crate) client_id: String,
    pub(crate) scopes: Vec<String>,
    pub(crate) profile: ConnectionProfile,
    pub(crate) primary: RealmSession,
    pub(crate) secondary: RealmSession,
    pub(crate) store: Option<Arc<dyn ConfigStore>>,
}

impl Connection {
    /// Typed API clients bound to the current access tokens. Never
    /// performs network I/O itself.
    pub fn api(&self) -> ApiClientSet {
        ApiClientSet::new(
            self.http.clone(),
            self.api_url.clone(),
            self.primary.tokens.access_token.clone(),
            self.secondary.tokens.access_token.clone(),
        )
    }

    /// Current tokens for a realm.
    pub fn tokens(&self, realm: Realm) -> &TokenPair {
        match realm {
            Realm::Primary => &self.primary.tokens,
            Realm::Secondary => &self.secondary.tokens,
        }
    }

    /// Verify that every realm the profile requires holds tokens.
    /// No network I/O: an unauthenticated realm fails fast.
    pub fn ensure_authenticated(&self) -> Result<(), ConnectionError> {
        if self.profile.require_auth && self.primary.tokens.is_empty() {
            return Err(ConnectionError::Unauthenticated(Realm::Primary));
        }
        if self.profile.require_secondary_auth && self.secondary.tokens.is_empty() {
            return Err(ConnectionError::Unauthenticated(Realm::Secondary));
        }
        Ok(())
    }

    /// Refresh each realm whose refresh token is set.
    ///
    /// One realm's failure does not stop the other realm's attempt; the
    /// first error is returned once both have been tried. A rotated
    /// refresh token overwrites the stored one. Refreshed tokens are
    /// written back through the config store when one is attached.
    pub async fn refresh_tokens(&mut self) -> Result<(), ConnectionError> {
        self.ensure_authenticated()?;

        let mut first_error = None;
        let mut refreshed = false;

        let http = self.http.clone();
        let client_id = self.client_id.clone();
        let scopes = self.scopes.clone();

        for realm in [Realm::Primary, Realm::Secondary] {
            match Self::refresh_realm(&http, &client_id, &scopes, realm, self.session_mut(realm))
                .await
            {
                Ok(changed) => refreshed |= changed,
                Err(err) => {
                    tracing::warn!(%realm, error = %err, "token refresh failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        if refreshed {
            self.persist_tokens()?;
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// End the session with every realm that holds tokens, then clear
    /// both local pairs. On any transport failure the pairs are left
    /// untouched and the error is surfaced.
    pub async fn logout(&mut self) -> Result<(), ConnectionError> {
        for realm in [Realm::Primary, Realm::Secondary] {
            let client_id = self.client_id.clone();
            let http = self.http.clone();
            let session = self.session_mut(realm);
            if session.tokens.refresh_token.is_empty() {
                continue;
            }

            let metadata = session.metadata(&http).await?;
            let Some(end_session) = metadata.end_session_endpoint else {
                tracing::debug!(%realm, "provider has no end-session endpoint");
                continue;
            };

            let response = http
                .post(&end_session)
                .form(&[
                    ("client_id", client_id.as_str()),
                    ("refresh_token", session.tokens.refresh_token.as_str()),
                ])
                .send()
                .await
                .map_err(|err| ConnectionError::LogoutFailed(err.to_string()))?;

            if !(response.status().is_success() || response.status().is_redirection()) {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(ConnectionError::LogoutFailed(format!(
                    "{realm} realm answered HTTP {status}: {body}"
                )));
            }
            tracing::debug!(%realm, "provider session ended");
        }

        self.primary.tokens.clear();
        self.secondary.tokens.clear();
        self.persist_tokens()?;
        Ok(())
    }

    fn session_mut(&mut self, realm: Realm) -> &mut RealmSession {
        match realm {
            Realm::Primary => &mut self.primary,
            Realm::Secondary => &mut self.secondary,
        }
    }

    async fn refresh_realm(
        http: &reqwest::Client,
        client_id: &str,
        scopes: &[String],
        realm: Realm,
        session: &mut RealmSession,
    ) -> Result<bool, ConnectionError> {
        if session.tokens.refresh_token.is_empty() {
            tracing::debug!(%realm, "no refresh token, skipping refresh");
            return Ok(false);
        }

        let metadata = session.metadata(http).await?;

        let scope = scopes.join(" ");
        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", session.tokens.refresh_token.as_str()),
            ("client_id", client_id),
        ];
        if !scope.is_empty() {
            form.push(("scope", scope.as_str()));
        }

        let response = http
            .post(&metadata.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|err| ConnectionError::RefreshFailed {
                realm,
                reason: err.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectionError::RefreshFailed {
                realm,
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let tokens: TokenResponse =
            response
                .json()
                .await
                .map_err(|err| ConnectionError::RefreshFailed {
                    realm,
                    reason: err.to_string(),
                })?;

        session.tokens.access_token = tokens.access_token;
        if let Some(rotated) = tokens.refresh_token {
            session.tokens.refresh_token = rotated;
        }
        tracing::debug!(%realm, "tokens refreshed");
        Ok(true)
    }

    /// Write the current token pairs back to the persisted config.
    fn persist_tokens(&self) -> Result<(), ConnectionError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let mut config = store.load()?;
        config.tokens = self.primary.tokens.clone();
        config.secondary_tokens = self.secondary.tokens.clone();
        store.save(&config)?;
        Ok(())
    }
}

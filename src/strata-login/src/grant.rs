//! Authorization code grant orchestration across both realms.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;

use strata_config::Config;

use crate::attempt::{RealmAttempt, RealmConfig, RealmLogin, RunningAttempt};
use crate::browser::open_in_browser;
use crate::error::AuthError;
use crate::provider::discover;

/// How long one realm attempt waits for the browser redirect.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(300);

/// The two identity realms the CLI authenticates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Realm {
    /// Main identity provider; guards the management API.
    Primary,
    /// Second SSO realm; used only by per-instance admin endpoints.
    Secondary,
}

impl std::fmt::Display for Realm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Realm::Primary => write!(f, "primary"),
            Realm::Secondary => write!(f, "secondary"),
        }
    }
}

/// Runs the interactive end-to-end login: primary realm first, then the
/// secondary realm, each through its own loopback listener and redirect.
///
/// How the authorization URL reaches the user is the caller's concern;
/// commands pass [`browser_presenter`] or their own closure.
pub struct AuthorizationCodeGrant {
    /// Client used for discovery, code exchange, and JWKS fetches.
    /// Carries the insecure transport when the user asked for it.
    pub http: reqwest::Client,
    /// OpenID client identifier sent to both realms.
    pub client_id: String,
    /// Scopes requested from both realms.
    pub scopes: Vec<String>,
    /// Per-realm deadline for the redirect to arrive.
    pub attempt_timeout: Duration,
}

impl AuthorizationCodeGrant {
    pub fn new(http: reqwest::Client, client_id: impl Into<String>, scopes: Vec<String>) -> Self {
        Self {
            http,
            client_id: client_id.into(),
            scopes,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// Run the full login. Realms are attempted sequentially; a primary
    /// failure aborts before the secondary realm is tried. Tokens are
    /// written into `config` as each realm completes, so a later failure
    /// leaves earlier realms' fresh tokens in place (partial success is
    /// observable). The caller persists `config`.
    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        config: &mut Config,
        primary: &RealmConfig,
        secondary: &RealmConfig,
        present: impl Fn(Realm, &RunningAttempt),
    ) -> Result<(), AuthError> {
        let login = self
            .login_realm(cancel, primary, Realm::Primary, &present)
            .await?;
        config.tokens = login.tokens;

        let login = self
            .login_realm(cancel, secondary, Realm::Secondary, &present)
            .await?;
        config.secondary_tokens = login.tokens;

        Ok(())
    }

    async fn login_realm(
        &self,
        cancel: &CancellationToken,
        realm: &RealmConfig,
        which: Realm,
        present: &impl Fn(Realm, &RunningAttempt),
    ) -> Result<RealmLogin, AuthError> {
        let metadata = discover(&self.http, &realm.auth_url).await?;

        let attempt = RealmAttempt {
            http: self.http.clone(),
            client_id: self.client_id.clone(),
            scopes: self.scopes.clone(),
            realm: realm.clone(),
            metadata,
        };
        let running = attempt.start().await?;

        tracing::info!(
            realm = %which,
            port = running.port,
            "waiting for login redirect"
        );
        present(which, &running);

        let login = running.wait(self.attempt_timeout, cancel).await?;

        match &login.username {
            Some(username) => {
                tracing::info!(realm = %which, %username, "realm login completed")
            }
            None => tracing::info!(realm = %which, "realm login completed"),
        }

        Ok(login)
    }
}

/// Standard presenter: open the URL in a browser, or print it when
/// `print_url` is set or no browser can be launched.
pub fn browser_presenter(print_url: bool) -> impl Fn(Realm, &RunningAttempt) {
    move |_realm, running| {
        let url: &Url = &running.authorization_url;
        if print_url {
            println!("{url}");
            return;
        }
        match open_in_browser(url.as_str()) {
            Ok(()) => println!("Your browser has been opened to complete the login."),
            Err(err) => {
                tracing::debug!(error = %err, "could not launch a browser");
                println!("Open this URL in your browser to log in:\n\n  {url}\n");
            }
        }
    }
}

/// Non-interactive bootstrap from a long-lived offline token.
///
/// Seeds the primary refresh token and clears the secondary pair — the
/// offline-token path has no secondary-realm equivalent. No network I/O
/// happens here; the token is first used at the next refresh.
pub fn bootstrap_offline_token(config: &mut Config, offline_token: &str) {
    config.tokens.refresh_token = offline_token.to_string();
    config.secondary_tokens.clear();
    tracing::debug!("seeded offline token for the primary realm");
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_config::TokenPair;

    #[test]
    fn test_offline_bootstrap_seeds_primary_and_clears_secondary() {
        let mut config = Config {
            secondary_tokens: TokenPair {
                access_token: "stale-access".to_string(),
                refresh_token: "stale-refresh".to_string(),
            },
            ..Default::default()
        };

        bootstrap_offline_token(&mut config, "abc123");

        assert_eq!(config.tokens.refresh_token, "abc123");
        assert!(config.secondary_tokens.is_empty());
    }

    #[test]
    fn test_offline_bootstrap_keeps_existing_access_token() {
        let mut config = Config {
            tokens: TokenPair {
                access_token: "still-valid".to_string(),
                refresh_token: "old-refresh".to_string(),
            },
            ..Default::default()
        };

        bootstrap_offline_token(&mut config, "abc123");

        assert_eq!(config.tokens.access_token, "still-valid");
        assert_eq!(config.tokens.refresh_token, "abc123");
    }
}

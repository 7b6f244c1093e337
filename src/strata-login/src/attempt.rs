//! One realm's login attempt: the loopback listener, the redirect
//! callback handler, and the completion signal back to the orchestrator.
//!
//! Per attempt the handler moves through
//! `WaitingForRedirect → ValidatingState → ExchangingCode →
//! VerifyingIdToken → Completed | Failed`; only the first redirect that
//! passes state validation is honoured. A request with a foreign `state`
//! is answered with 400 and recorded, but does not consume the attempt —
//! the genuine redirect may still be on its way.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use tokio::sync::{Mutex, oneshot};
use tokio_util::sync::CancellationToken;
use url::Url;

use strata_config::TokenPair;

use crate::error::AuthError;
use crate::provider::{ProviderMetadata, TokenResponse, fetch_jwks, verify_id_token};
use crate::token;

/// One identity realm, as supplied by the command layer.
#[derive(Debug, Clone)]
pub struct RealmConfig {
    /// Base URL of the realm's authentication server.
    pub auth_url: Url,
    /// Path the local listener registers for this realm's redirect.
    pub callback_path: String,
}

impl RealmConfig {
    pub fn new(auth_url: Url, callback_path: impl Into<String>) -> Self {
        Self {
            auth_url,
            callback_path: callback_path.into(),
        }
    }
}

/// Outcome of one completed realm attempt.
#[derive(Debug)]
pub struct RealmLogin {
    /// Freshly exchanged tokens for the realm.
    pub tokens: TokenPair,
    /// Best-effort username for confirmation output.
    pub username: Option<String>,
}

/// Inputs for a single realm attempt.
pub struct RealmAttempt {
    pub http: reqwest::Client,
    pub client_id: String,
    pub scopes: Vec<String>,
    pub realm: RealmConfig,
    pub metadata: ProviderMetadata,
}

/// A started attempt: listener bound, authorization URL built, handler
/// armed. Consumed by [`RunningAttempt::wait`].
pub struct RunningAttempt {
    /// URL the user's browser must visit.
    pub authorization_url: Url,
    /// Redirect URI registered with the provider.
    pub redirect_uri: String,
    /// Port the loopback listener is bound to.
    pub port: u16,
    completion: oneshot::Receiver<Result<RealmLogin, AuthError>>,
    context: Arc<CallbackContext>,
    shutdown: CancellationToken,
    server: tokio::task::JoinHandle<()>,
}

impl RealmAttempt {
    /// Bind the loopback listener and arm the callback handler.
    pub async fn start(self) -> Result<RunningAttempt, AuthError> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();

        let path = self.realm.callback_path.trim_start_matches('/').to_string();
        let redirect_uri = format!("http://localhost:{port}/{path}");
        let state = new_state();

        let authorization_url = build_authorization_url(
            &self.metadata.authorization_endpoint,
            &self.client_id,
            &self.scopes,
            &redirect_uri,
            &state,
        )?;

        let (tx, rx) = oneshot::channel();
        let context = Arc::new(CallbackContext {
            http: self.http,
            client_id: self.client_id,
            redirect_uri: redirect_uri.clone(),
            state,
            token_endpoint: self.metadata.token_endpoint.clone(),
            jwks_uri: self.metadata.jwks_uri.clone(),
            issuer: self.metadata.issuer.clone(),
            auth_host: self
                .realm
                .auth_url
                .host_str()
                .unwrap_or("the authentication server")
                .to_string(),
            completion: Mutex::new(Some(tx)),
            rejection: Mutex::new(None),
        });

        let handler_context = context.clone();
        let app = Router::new().route(
            &format!("/{path}"),
            get(move |Query(params): Query<HashMap<String, String>>| {
                let context = handler_context.clone();
                async move { handle_redirect(context, params).await }
            }),
        );

        let shutdown = CancellationToken::new();
        let signal = shutdown.clone().cancelled_owned();
        let server = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await
            {
                tracing::error!(error = %err, "callback listener failed");
            }
        });

        tracing::debug!(%redirect_uri, "callback listener bound");

        Ok(RunningAttempt {
            authorization_url,
            redirect_uri,
            port,
            completion: rx,
            context,
            shutdown,
            server,
        })
    }
}

impl RunningAttempt {
    /// Block until the handler completes, the deadline elapses, or the
    /// caller cancels. The listener is released on every exit path.
    pub async fn wait(
        self,
        deadline: std::time::Duration,
        cancel: &CancellationToken,
    ) -> Result<RealmLogin, AuthError> {
        let RunningAttempt {
            completion,
            context,
            shutdown,
            server,
            ..
        } = self;

        let result = tokio::select! {
            outcome = completion => match outcome {
                Ok(outcome) => outcome,
                // Sender dropped without a verdict: the server task died.
                Err(_) => Err(AuthError::Cancelled),
            },
            _ = cancel.cancelled() => Err(AuthError::Cancelled),
            _ = tokio::time::sleep(deadline) => {
                // A recorded bad-state probe outranks a plain timeout.
                match context.rejection.lock().await.take() {
                    Some(err) => Err(err),
                    None => Err(AuthError::Timeout(deadline.as_secs())),
                }
            }
        };

        shutdown.cancel();
        let _ = server.await;
        result
    }
}

/// Everything the redirect handler needs, shared with the waiting side.
struct CallbackContext {
    http: reqwest::Client,
    client_id: String,
    redirect_uri: String,
    state: String,
    token_endpoint: String,
    jwks_uri: String,
    issuer: String,
    auth_host: String,
    completion: Mutex<Option<oneshot::Sender<Result<RealmLogin, AuthError>>>>,
    rejection: Mutex<Option<AuthError>>,
}

async fn handle_redirect(
    context: Arc<CallbackContext>,
    params: HashMap<String, String>,
) -> Response {
    // State validation comes before anything else. A mismatch rejects
    // this request only; the attempt stays armed for the real redirect.
    let received_state = params.get("state").map(String::as_str).unwrap_or_default();
    if received_state != context.state {
        tracing::warn!("redirect carried an unknown state parameter");
        context
            .rejection
            .lock()
            .await
            .get_or_insert(AuthError::InvalidState);
        return (StatusCode::BAD_REQUEST, "state did not match").into_response();
    }

    let Some(tx) = context.completion.lock().await.take() else {
        // Duplicate redirect after the attempt already finished.
        return (StatusCode::GONE, "login already completed").into_response();
    };

    if let Some(error) = params.get("error") {
        let description = params
            .get("error_description")
            .map(String::as_str)
            .unwrap_or(error);
        let err = AuthError::ExchangeFailed(description.to_string());
        let body = err.to_string();
        let _ = tx.send(Err(err));
        return (StatusCode::BAD_REQUEST, body).into_response();
    }

    let Some(code) = params.get("code") else {
        let err = AuthError::ExchangeFailed("authorization code missing".to_string());
        let body = err.to_string();
        let _ = tx.send(Err(err));
        return (StatusCode::BAD_REQUEST, body).into_response();
    };

    match exchange_and_verify(&context, code).await {
        Ok(login) => {
            let page = confirmation_page(
                &context.auth_host,
                login.username.as_deref().unwrap_or("unknown"),
            );
            let _ = tx.send(Ok(login));
            Html(page).into_response()
        }
        Err(err) => {
            let body = err.to_string();
            let _ = tx.send(Err(err));
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

/// Exchange the authorization code and verify the returned ID token.
async fn exchange_and_verify(
    context: &CallbackContext,
    code: &str,
) -> Result<RealmLogin, AuthError> {
    let response = context
        .http
        .post(&context.token_endpoint)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &context.redirect_uri),
            ("client_id", &context.client_id),
        ])
        .send()
        .await
        .map_err(|err| AuthError::ExchangeFailed(err.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::ExchangeFailed(format!("HTTP {status}: {body}")));
    }

    let tokens: TokenResponse = response
        .json()
        .await
        .map_err(|err| AuthError::ExchangeFailed(err.to_string()))?;

    let Some(refresh_token) = tokens.refresh_token else {
        return Err(AuthError::ExchangeFailed(
            "token response carried no refresh token".to_string(),
        ));
    };
    let Some(raw_id_token) = tokens.id_token.as_deref() else {
        return Err(AuthError::VerificationFailed(
            "token response carried no ID token".to_string(),
        ));
    };

    let jwks = fetch_jwks(&context.http, &context.jwks_uri).await?;
    let claims = verify_id_token(&jwks, &context.issuer, &context.client_id, raw_id_token)?;

    tracing::debug!(subject = ?claims.sub, "ID token verified");

    let username = token::username(&tokens.access_token).or(claims.preferred_username);

    Ok(RealmLogin {
        tokens: TokenPair {
            access_token: tokens.access_token,
            refresh_token,
        },
        username,
    })
}

/// Fresh CSRF state for one authorization URL.
fn new_state() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

fn build_authorization_url(
    authorization_endpoint: &str,
    client_id: &str,
    scopes: &[String],
    redirect_uri: &str,
    state: &str,
) -> Result<Url, AuthError> {
    let mut url = Url::parse(authorization_endpoint).map_err(|err| AuthError::Discovery {
        url: authorization_endpoint.to_string(),
        reason: err.to_string(),
    })?;

    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", &scopes.join(" "))
        .append_pair("state", state);

    Ok(url)
}

fn confirmation_page(host: &str, username: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Signed in to Strata</title>
  </head>
  <body>
    <h1>Signed in to {host}</h1>
    <p>You are logged in as <strong>{username}</strong>.
       You can close this window and return to the terminal.</p>
  </body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_fresh_and_url_safe() {
        let a = new_state();
        let b = new_state();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_authorization_url_carries_all_parameters() {
        let url = build_authorization_url(
            "https://sso.example/realms/x/auth",
            "strata-cli",
            &["openid".to_string(), "offline_access".to_string()],
            "http://localhost:7777/sso-callback",
            "opaque-state",
        )
        .unwrap();

        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "strata-cli");
        assert_eq!(params["redirect_uri"], "http://localhost:7777/sso-callback");
        assert_eq!(params["scope"], "openid offline_access");
        assert_eq!(params["state"], "opaque-state");
    }

    #[test]
    fn test_confirmation_page_names_host_and_user() {
        let page = confirmation_page("sso.example", "jdoe");
        assert!(page.contains("sso.example"));
        assert!(page.contains("jdoe"));
    }
}

//! The `login` command: interactive authorization code grant, or
//! non-interactive offline-token bootstrap.

use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use strata_config::ConfigStore;
use strata_connection::{ConnectionProfile, USER_AGENT};
use strata_login::{
    AuthorizationCodeGrant, RealmConfig, bootstrap_offline_token, browser_presenter, token,
};

use crate::cli::LoginArgs;
use crate::defaults;
use crate::factory;

pub async fn run(args: LoginArgs) -> anyhow::Result<()> {
    let gateway_url = defaults::resolve_api_gateway(&args.api_gateway)?;
    let auth_url = defaults::resolve_auth_url(&args.auth_url)?;
    let secondary_auth_url = defaults::resolve_secondary_auth_url(&args.secondary_auth_url)?;

    // The offline-token flow authenticates as a different public client.
    let client_id = match &args.offline_token {
        Some(_) if args.client_id == defaults::CLIENT_ID => {
            defaults::OFFLINE_TOKEN_CLIENT_ID.to_string()
        }
        _ => args.client_id.clone(),
    };
    let scopes = if args.scopes.is_empty() {
        defaults::DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
    } else {
        args.scopes.clone()
    };

    let store = factory::config_store()?;
    let mut config = factory::load_config(&store)?;

    // Record what this login used before tokens arrive, so a partially
    // successful interactive login persists coherently.
    config.api_url = gateway_url.to_string();
    config.auth_url = auth_url.to_string();
    config.secondary_auth_url = secondary_auth_url.to_string();
    config.client_id = client_id.clone();
    config.scopes = scopes.clone();
    config.insecure = args.insecure;

    match &args.offline_token {
        Some(offline_token) => {
            bootstrap_offline_token(&mut config, offline_token);
            store.save(&config)?;

            // Force one refresh so a bad token fails the login now, not
            // on the next command.
            let outcome =
                factory::build_connection(store, ConnectionProfile::SKIP_SECONDARY_AUTH).await?;
            let connection = factory::require_fresh_tokens(outcome)
                .context("the offline token was not accepted")?;

            greet(&connection.tokens(strata_login::Realm::Primary).access_token);
        }
        None => {
            let mut client_builder = reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(30));
            if args.insecure {
                tracing::warn!("TLS certificate verification is disabled");
                client_builder = client_builder.danger_accept_invalid_certs(true);
            }
            let http = client_builder.build()?;

            let grant = AuthorizationCodeGrant::new(http, client_id, scopes);
            let primary = RealmConfig::new(auth_url, defaults::PRIMARY_CALLBACK_PATH);
            let secondary =
                RealmConfig::new(secondary_auth_url, defaults::SECONDARY_CALLBACK_PATH);

            let cancel = CancellationToken::new();
            let interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    interrupt.cancel();
                }
            });

            let tokens_before = config.tokens.clone();
            let result = grant
                .execute(
                    &cancel,
                    &mut config,
                    &primary,
                    &secondary,
                    browser_presenter(args.print_sso_url),
                )
                .await;

            if let Err(err) = result {
                // A realm that completed keeps its fresh tokens; a login
                // that produced nothing leaves the config untouched.
                if config.tokens != tokens_before {
                    store.save(&config)?;
                }
                return Err(err.into());
            }

            store.save(&config)?;
            greet(&config.tokens.access_token);
        }
    }

    Ok(())
}

fn greet(access_token: &str) {
    match token::username(access_token) {
        Some(username) => println!("Logged in as {username}."),
        None => println!("Logged in."),
    }
}

//! Connection lifecycle tests against a mock provider and gateway.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use strata_config::{Config, ConfigStore, FileConfigStore, TokenPair};
use strata_connection::{ConnectionBuilder, ConnectionError, ConnectionProfile};
use strata_login::Realm;

/// Mount the discovery document for one realm.
async fn mount_discovery(server: &MockServer, realm: &str) {
    let issuer = format!("{}/{realm}", server.uri());
    Mock::given(method("GET"))
        .and(path(format!("/{realm}/.well-known/openid-configuration")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": issuer,
            "authorization_endpoint": format!("{issuer}/auth"),
            "token_endpoint": format!("{issuer}/token"),
            "jwks_uri": format!("{issuer}/certs"),
            "end_session_endpoint": format!("{issuer}/logout"),
        })))
        .mount(server)
        .await;
}

/// Mount a refresh-grant response for one stored refresh token.
async fn mount_refresh(
    server: &MockServer,
    realm: &str,
    stored_refresh: &str,
    new_access: &str,
    rotated_refresh: Option<&str>,
) {
    let mut body = json!({
        "access_token": new_access,
        "expires_in": 300,
        "token_type": "Bearer",
    });
    if let Some(rotated) = rotated_refresh {
        body["refresh_token"] = json!(rotated);
    }

    Mock::given(method("POST"))
        .and(path(format!("/{realm}/token")))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains(format!(
            "refresh_token={stored_refresh}"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn builder_for(server: &MockServer) -> ConnectionBuilder {
    ConnectionBuilder::new()
        .with_api_url(server.uri())
        .with_auth_url(format!("{}/primary", server.uri()))
        .with_secondary_auth_url(format!("{}/secondary", server.uri()))
        .with_client_id("strata-cli")
}

#[tokio::test]
async fn build_refreshes_both_realms() {
    let server = MockServer::start().await;
    mount_discovery(&server, "primary").await;
    mount_discovery(&server, "secondary").await;
    mount_refresh(&server, "primary", "p-r1", "p-a2", Some("p-r2")).await;
    mount_refresh(&server, "secondary", "s-r1", "s-a2", None).await;

    let outcome = builder_for(&server)
        .with_access_token("p-a1")
        .with_refresh_token("p-r1")
        .with_secondary_access_token("s-a1")
        .with_secondary_refresh_token("s-r1")
        .build()
        .await
        .unwrap();

    assert!(outcome.refresh_error.is_none());
    let connection = outcome.connection;

    assert_eq!(connection.tokens(Realm::Primary).access_token, "p-a2");
    // Rotation overwrites the stored refresh token.
    assert_eq!(connection.tokens(Realm::Primary).refresh_token, "p-r2");
    assert_eq!(connection.tokens(Realm::Secondary).access_token, "s-a2");
    // No rotation: the stored refresh token is kept.
    assert_eq!(connection.tokens(Realm::Secondary).refresh_token, "s-r1");
}

#[tokio::test]
async fn second_refresh_uses_the_rotated_token() {
    let server = MockServer::start().await;
    mount_discovery(&server, "primary").await;
    mount_refresh(&server, "primary", "r1", "a2", Some("r2")).await;
    mount_refresh(&server, "primary", "r2", "a3", Some("r3")).await;

    let outcome = builder_for(&server)
        .with_access_token("a1")
        .with_refresh_token("r1")
        .with_profile(ConnectionProfile::SKIP_SECONDARY_AUTH)
        .build()
        .await
        .unwrap();
    assert!(outcome.refresh_error.is_none());
    let mut connection = outcome.connection;
    assert_eq!(connection.tokens(Realm::Primary).refresh_token, "r2");

    connection.refresh_tokens().await.unwrap();

    assert_eq!(connection.tokens(Realm::Primary).access_token, "a3");
    assert_eq!(connection.tokens(Realm::Primary).refresh_token, "r3");
}

#[tokio::test]
async fn refresh_is_idempotent_without_rotation() {
    let server = MockServer::start().await;
    mount_discovery(&server, "primary").await;
    mount_refresh(&server, "primary", "r1", "a2", None).await;

    let outcome = builder_for(&server)
        .with_access_token("a1")
        .with_refresh_token("r1")
        .with_profile(ConnectionProfile::SKIP_SECONDARY_AUTH)
        .build()
        .await
        .unwrap();
    let mut connection = outcome.connection;

    connection.refresh_tokens().await.unwrap();

    assert_eq!(connection.tokens(Realm::Primary).access_token, "a2");
    assert_eq!(connection.tokens(Realm::Primary).refresh_token, "r1");
}

#[tokio::test]
async fn one_realm_failing_does_not_block_the_other() {
    let server = MockServer::start().await;
    mount_discovery(&server, "primary").await;
    mount_discovery(&server, "secondary").await;
    Mock::given(method("POST"))
        .and(path("/primary/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token is not active",
        })))
        .mount(&server)
        .await;
    mount_refresh(&server, "secondary", "s-r1", "s-a2", None).await;

    let outcome = builder_for(&server)
        .with_access_token("p-a1")
        .with_refresh_token("p-r1")
        .with_secondary_access_token("s-a1")
        .with_secondary_refresh_token("s-r1")
        .build()
        .await
        .unwrap();

    match outcome.refresh_error {
        Some(ConnectionError::RefreshFailed { realm, .. }) => assert_eq!(realm, Realm::Primary),
        other => panic!("expected primary RefreshFailed, got {other:?}"),
    }
    // The secondary realm was still refreshed.
    assert_eq!(
        outcome.connection.tokens(Realm::Secondary).access_token,
        "s-a2"
    );
}

#[tokio::test]
async fn build_fails_fast_without_tokens() {
    let server = MockServer::start().await;

    let err = builder_for(&server).build().await.unwrap_err();
    assert!(
        matches!(err, ConnectionError::Unauthenticated(Realm::Primary)),
        "got {err:?}"
    );

    let err = builder_for(&server)
        .with_access_token("p-a1")
        .build()
        .await
        .unwrap_err();
    assert!(
        matches!(err, ConnectionError::Unauthenticated(Realm::Secondary)),
        "got {err:?}"
    );

    // No mocks were mounted: fail-fast must not touch the network.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn skip_secondary_profile_accepts_primary_only() {
    let server = MockServer::start().await;

    // Access token only: nothing to refresh, so no network either.
    let outcome = builder_for(&server)
        .with_access_token("p-a1")
        .with_profile(ConnectionProfile::SKIP_SECONDARY_AUTH)
        .build()
        .await
        .unwrap();

    assert!(outcome.refresh_error.is_none());
    assert_eq!(
        outcome.connection.tokens(Realm::Primary).access_token,
        "p-a1"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

fn seeded_store(dir: &tempfile::TempDir) -> Arc<FileConfigStore> {
    let store = Arc::new(FileConfigStore::new(dir.path().join("config.json")));
    let config = Config {
        tokens: TokenPair {
            access_token: "p-a1".to_string(),
            refresh_token: "p-r1".to_string(),
        },
        secondary_tokens: TokenPair {
            access_token: "s-a1".to_string(),
            refresh_token: "s-r1".to_string(),
        },
        ..Default::default()
    };
    store.save(&config).unwrap();
    store
}

#[tokio::test]
async fn logout_clears_both_pairs_and_persists() {
    let server = MockServer::start().await;
    mount_discovery(&server, "primary").await;
    mount_discovery(&server, "secondary").await;
    mount_refresh(&server, "primary", "p-r1", "p-a2", None).await;
    mount_refresh(&server, "secondary", "s-r1", "s-a2", None).await;
    for realm in ["primary", "secondary"] {
        Mock::given(method("POST"))
            .and(path(format!("/{realm}/logout")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir);

    let outcome = builder_for(&server)
        .with_access_token("p-a1")
        .with_refresh_token("p-r1")
        .with_secondary_access_token("s-a1")
        .with_secondary_refresh_token("s-r1")
        .with_config_store(store.clone())
        .build()
        .await
        .unwrap();
    let mut connection = outcome.connection;

    connection.logout().await.unwrap();

    assert!(connection.tokens(Realm::Primary).is_empty());
    assert!(connection.tokens(Realm::Secondary).is_empty());

    let persisted = store.load().unwrap();
    assert!(persisted.tokens.is_empty());
    assert!(persisted.secondary_tokens.is_empty());
}

#[tokio::test]
async fn failed_logout_leaves_tokens_untouched() {
    let server = MockServer::start().await;
    mount_discovery(&server, "primary").await;
    mount_discovery(&server, "secondary").await;
    mount_refresh(&server, "primary", "p-r1", "p-a2", None).await;
    mount_refresh(&server, "secondary", "s-r1", "s-a2", None).await;
    Mock::given(method("POST"))
        .and(path("/primary/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir);

    let outcome = builder_for(&server)
        .with_access_token("p-a1")
        .with_refresh_token("p-r1")
        .with_secondary_access_token("s-a1")
        .with_secondary_refresh_token("s-r1")
        .with_config_store(store.clone())
        .build()
        .await
        .unwrap();
    let mut connection = outcome.connection;

    let err = connection.logout().await.unwrap_err();
    assert!(matches!(err, ConnectionError::LogoutFailed(_)), "got {err:?}");

    // Local state and the persisted config are unchanged.
    assert!(!connection.tokens(Realm::Primary).is_empty());
    assert!(!connection.tokens(Realm::Secondary).is_empty());
    let persisted = store.load().unwrap();
    assert_eq!(persisted.tokens.refresh_token, "p-r1");
    assert_eq!(persisted.secondary_tokens.refresh_token, "s-r1");
}

#[tokio::test]
async fn refreshed_tokens_are_persisted_through_the_store() {
    let server = MockServer::start().await;
    mount_discovery(&server, "primary").await;
    mount_discovery(&server, "secondary").await;
    mount_refresh(&server, "primary", "p-r1", "p-a2", Some("p-r2")).await;
    mount_refresh(&server, "secondary", "s-r1", "s-a2", None).await;

    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir);

    let outcome = builder_for(&server)
        .with_access_token("p-a1")
        .with_refresh_token("p-r1")
        .with_secondary_access_token("s-a1")
        .with_secondary_refresh_token("s-r1")
        .with_config_store(store.clone())
        .build()
        .await
        .unwrap();
    assert!(outcome.refresh_error.is_none());

    let persisted = store.load().unwrap();
    assert_eq!(persisted.tokens.access_token, "p-a2");
    assert_eq!(persisted.tokens.refresh_token, "p-r2");
    assert_eq!(persisted.secondary_tokens.access_token, "s-a2");
}

#[tokio::test]
async fn streams_list_uses_the_primary_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/streams/v1/instances"))
        .and(header("authorization", "Bearer p-a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": "c42", "name": "orders", "status": "ready"},
                {"id": "c43", "name": "payments", "status": "provisioning"},
            ],
        })))
        .mount(&server)
        .await;

    let outcome = builder_for(&server)
        .with_access_token("p-a1")
        .with_profile(ConnectionProfile::SKIP_SECONDARY_AUTH)
        .build()
        .await
        .unwrap();

    let instances = outcome.connection.api().streams().list().await.unwrap();
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].id, "c42");
    assert_eq!(instances[1].status, "provisioning");
}

#[tokio::test]
async fn instance_admin_fails_fast_without_secondary_token() {
    let server = MockServer::start().await;

    let outcome = builder_for(&server)
        .with_access_token("p-a1")
        .with_profile(ConnectionProfile::SKIP_SECONDARY_AUTH)
        .build()
        .await
        .unwrap();

    let admin = outcome
        .connection
        .api()
        .instance_admin(url::Url::parse(&server.uri()).unwrap());
    let err = admin.topics().await.unwrap_err();
    assert!(
        matches!(err, ConnectionError::Unauthenticated(Realm::Secondary)),
        "got {err:?}"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn api_error_statuses_surface_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/streams/v1/instances"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let outcome = builder_for(&server)
        .with_access_token("p-a1")
        .with_profile(ConnectionProfile::SKIP_SECONDARY_AUTH)
        .build()
        .await
        .unwrap();

    let err = outcome.connection.api().streams().list().await.unwrap_err();
    match err {
        ConnectionError::Api { status, body } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

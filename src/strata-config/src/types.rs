//! Configuration data model.

use serde::{Deserialize, Serialize};

/// An access/refresh token combination for one SSO realm.
///
/// Either both fields are empty (the realm is unauthenticated) or
/// `access_token` is present. The refresh token may outlive the access
/// token's validity.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Bearer access token.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_token: String,
    /// Offline or refresh token.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,
}

impl TokenPair {
    /// Whether this realm holds no usable credential at all.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty() && self.refresh_token.is_empty()
    }

    /// Blank both tokens.
    pub fn clear(&mut self) {
        self.access_token.clear();
        self.refresh_token.clear();
    }
}

// Token bytes never appear in logs or debug dumps.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

fn redact(token: &str) -> &'static str {
    if token.is_empty() { "<empty>" } else { "<redacted>" }
}

/// Context for the managed streams service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamsConfig {
    /// Identifier of the currently selected stream instance.
    pub instance_id: String,
}

/// Context for the schema registry service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Identifier of the currently selected registry instance.
    pub instance_id: String,
    /// Display name of the instance.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// Properties persisted between CLI invocations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Tokens for the primary identity provider.
    #[serde(default, skip_serializing_if = "TokenPair::is_empty")]
    pub tokens: TokenPair,
    /// Tokens for the secondary SSO realm (per-instance operations).
    #[serde(default, skip_serializing_if = "TokenPair::is_empty")]
    pub secondary_tokens: TokenPair,

    /// URL of the API gateway.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_url: String,
    /// Base URL of the primary authentication server.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_url: String,
    /// Base URL of the secondary authentication server.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secondary_auth_url: String,

    /// OpenID client identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_id: String,
    /// OpenID scopes requested at login. Replaces the defaults entirely
    /// when set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    /// Disables verification of TLS certificates and host names.
    #[serde(default)]
    pub insecure: bool,

    /// Streams service context, if one has been selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streams: Option<StreamsConfig>,
    /// Registry service context, if one has been selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryConfig>,
}

impl Config {
    /// Whether a stream instance has been selected.
    pub fn has_streams_instance(&self) -> bool {
        self.streams
            .as_ref()
            .is_some_and(|s| !s.instance_id.is_empty())
    }

    /// Whether a registry instance has been selected.
    pub fn has_registry_instance(&self) -> bool {
        self.registry
            .as_ref()
            .is_some_and(|r| !r.instance_id.is_empty())
    }
}

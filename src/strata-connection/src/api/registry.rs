//! Management client for schema registry instances.

use serde::{Deserialize, Serialize};
use url::Url;

use strata_login::Realm;

use crate::error::ConnectionError;

use super::get_json;

/// A registry instance as returned by the management API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryInstance {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    /// Public endpoint of the registry itself.
    #[serde(default)]
    pub registry_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegistryInstanceList {
    items: Vec<RegistryInstance>,
}

pub struct RegistryClient {
    http: reqwest::Client,
    api_url: Url,
    token: String,
}

impl RegistryClient {
    pub(crate) fn new(http: reqwest::Client, api_url: Url, token: String) -> Self {
        Self {
            http,
            api_url,
            token,
        }
    }

    /// List the registry instances visible to the caller.
    pub async fn list(&self) -> Result<Vec<RegistryInstance>, ConnectionError> {
        let url = self
            .api_url
            .join("api/registry/v1/instances")
            .map_err(|err| ConnectionError::InvalidUrl {
                name: "API",
                value: self.api_url.to_string(),
                reason: err.to_string(),
            })?;
        let list: RegistryInstanceList =
            get_json(&self.http, url, &self.token, Realm::Primary).await?;
        Ok(list.items)
    }
}

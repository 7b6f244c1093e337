//! Management client for stream instances.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use strata_login::Realm;

use crate::error::ConnectionError;

use super::get_json;

/// A managed stream instance as returned by the management API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamInstance {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub owner: String,
    /// Instance-level admin API, served by the instance itself.
    #[serde(default)]
    pub admin_api_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct StreamInstanceList {
    items: Vec<StreamInstance>,
}

pub struct StreamsClient {
    http: reqwest::Client,
    api_url: Url,
    token: String,
}

impl StreamsClient {
    pub(crate) fn new(http: reqwest::Client, api_url: Url, token: String) -> Self {
        Self {
            http,
            api_url,
            token,
        }
    }

    fn endpoint(&self, suffix: &str) -> Result<Url, ConnectionError> {
        self.api_url
            .join(suffix)
            .map_err(|err| ConnectionError::InvalidUrl {
                name: "API",
                value: format!("{}{suffix}", self.api_url),
                reason: err.to_string(),
            })
    }

    /// List the stream instances visible to the caller.
    pub async fn list(&self) -> Result<Vec<StreamInstance>, ConnectionError> {
        let url = self.endpoint("api/streams/v1/instances")?;
        let list: StreamInstanceList =
            get_json(&self.http, url, &self.token, Realm::Primary).await?;
        Ok(list.items)
    }

    /// Fetch one stream instance by ID.
    pub async fn get(&self, id: &str) -> Result<StreamInstance, ConnectionError> {
        let url = self.endpoint(&format!("api/streams/v1/instances/{id}"))?;
        get_json(&self.http, url, &self.token, Realm::Primary).await
    }
}

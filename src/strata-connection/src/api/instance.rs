//! Admin client for one service instance.
//!
//! Instance admin endpoints are served by the instance itself, not the
//! management gateway, and authenticate against the secondary realm.

use serde::{Deserialize, Serialize};
use url::Url;

use strata_login::Realm;

use crate::error::ConnectionError;

use super::get_json;

/// A topic inside a stream instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    #[serde(default)]
    pub partitions: u32,
}

#[derive(Debug, Deserialize)]
struct TopicList {
    items: Vec<Topic>,
}

pub struct InstanceAdminClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl InstanceAdminClient {
    pub(crate) fn new(http: reqwest::Client, base_url: Url, token: String) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// List the topics of this instance.
    pub async fn topics(&self) -> Result<Vec<Topic>, ConnectionError> {
        let url = self
            .base_url
            .join("api/v1/topics")
            .map_err(|err| ConnectionError::InvalidUrl {
                name: "instance admin",
                value: self.base_url.to_string(),
                reason: err.to_string(),
            })?;
        let list: TopicList = get_json(&self.http, url, &self.token, Realm::Secondary).await?;
        Ok(list.items)
    }
}

// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! HTTP client for the repository server.
//!
//! Entity metadata comes from a JSON task posted to the comparison page;
//! result files are plain GETs on the URLs listed in that metadata.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClientConfig;
use crate::entity::EntityVersion;
use crate::envelope::{Envelope, Notifications};
use crate::error::{Error, Result};
use crate::route::CompareRoute;

pub const ENTITY_INFOS_TASK: &str = "getEntityInfos";

/// Body of a task request.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRequest<'a> {
    pub task: &'a str,
    #[serde(rename = "getBy")]
    pub get_by: &'a str,
    pub ids: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EntityInfos {
    #[serde(default)]
    entities: Vec<EntityVersion>,
}

#[derive(Clone)]
pub struct WebLabClient {
    base_url: String,
    client: reqwest::Client,
}

impl WebLabClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a server path or an already absolute URL.
    pub fn resolve(&self, url: &str) -> Result<String> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(url.to_string());
        }
        let base = reqwest::Url::parse(&format!("{}/", self.base_url))
            .map_err(|_| Error::InvalidUrl(self.base_url.clone()))?;
        base.join(url)
            .map(|u| u.to_string())
            .map_err(|_| Error::InvalidUrl(url.to_string()))
    }

    /// Fetch the versions named by a comparison route.
    pub async fn get_entity_infos(
        &self,
        route: &CompareRoute,
    ) -> Result<(Vec<EntityVersion>, Notifications)> {
        let request = TaskRequest {
            task: ENTITY_INFOS_TASK,
            get_by: "versionId",
            ids: &route.ids,
        };
        let envelope = self.post_task(&route.page_path(), &request).await?;
        let infos: EntityInfos = envelope.task(ENTITY_INFOS_TASK)?;
        debug!(
            requested = route.ids.len(),
            received = infos.entities.len(),
            "Fetched entity infos"
        );
        Ok((infos.entities, envelope.notifications))
    }

    /// POST a JSON task and decode the response envelope.
    pub async fn post_task<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Envelope> {
        let url = self.resolve(path)?;
        debug!(url = %url, "Posting task");
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| Error::Http {
                url: url.clone(),
                source,
            })?;
        let resp = check_status(&url, resp)?;
        let bytes = resp.bytes().await.map_err(|source| Error::Http {
            url: url.clone(),
            source,
        })?;
        Envelope::from_slice(&bytes)
    }

    /// GET a file as text.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let url = self.resolve(url)?;
        debug!(url = %url, "Fetching file");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| Error::Http {
                url: url.clone(),
                source,
            })?;
        let resp = check_status(&url, resp)?;
        resp.text().await.map_err(|source| Error::Http { url, source })
    }
}

fn check_status(url: &str, resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> WebLabClient {
        let config = ClientConfig {
            base_url: base.to_string(),
            ..ClientConfig::default()
        };
        WebLabClient::new(&config).unwrap()
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let c = client("http://localhost:8080/");
        assert_eq!(c.base_url(), "http://localhost:8080");
        assert_eq!(
            c.resolve("/download/1/trace.csv").unwrap(),
            "http://localhost:8080/download/1/trace.csv"
        );
        assert_eq!(
            c.resolve("https://files.example.org/a.csv").unwrap(),
            "https://files.example.org/a.csv"
        );
    }

    #[test]
    fn test_task_request_shape() {
        let ids = vec!["1".to_string(), "2".to_string()];
        let body = serde_json::to_value(TaskRequest {
            task: ENTITY_INFOS_TASK,
            get_by: "versionId",
            ids: &ids,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"task": "getEntityInfos", "getBy": "versionId", "ids": ["1", "2"]})
        );
    }
}

//! Google Books adapter (volume search).
//!
//! Implements the `tbb-core` [`BookCatalog`] port over the public
//! `books/v1/volumes` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use tbb_core::{
    config::Config,
    errors::Error,
    ports::{BookCatalog, CatalogQuery, CatalogVolume},
    Result,
};

#[derive(Clone, Debug)]
pub struct GoogleBooksClient {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl GoogleBooksClient {
    /// Build a client identified by `app_name` (sent as the user agent).
    pub fn new(
        app_name: &str,
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(app_name.to_string())
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("google books client build failed: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            &cfg.books_app_name,
            cfg.books_base_url.clone(),
            cfg.books_api_key.clone(),
            cfg.books_request_timeout,
        )
    }

    fn volumes_url(&self) -> String {
        format!("{}/books/v1/volumes", self.base_url)
    }

    fn query_params(&self, query: &CatalogQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", query.query.clone()),
            ("maxResults", query.max_results.to_string()),
            ("printType", query.print_type.as_query_value().to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }
        params
    }
}

#[derive(Debug, Default, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<VolumeItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeItem {
    #[serde(default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
}

fn parse_volumes(body: &str) -> Result<Vec<CatalogVolume>> {
    let resp: VolumesResponse = serde_json::from_str(body)?;
    Ok(resp
        .items
        .into_iter()
        .map(|item| CatalogVolume {
            title: item.volume_info.title,
            authors: item.volume_info.authors,
        })
        .collect())
}

#[async_trait]
impl BookCatalog for GoogleBooksClient {
    async fn list_volumes(&self, query: &CatalogQuery) -> Result<Vec<CatalogVolume>> {
        let resp = self
            .http
            .get(self.volumes_url())
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| Error::External(format!("google books request error: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::External(format!("google books read error: {e}")))?;

        if !status.is_success() {
            return Err(Error::External(format!(
                "google books search failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let volumes = parse_volumes(&body)?;
        debug!(query = %query.query, count = volumes.len(), "google books answered");
        Ok(volumes)
    }
}

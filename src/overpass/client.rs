//! HTTP client for the Overpass API.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::{form_urlencoded, Url};

use super::cache::ResponseCache;

const USER_AGENT: &str = "Alfresco/0.1 (outdoor seating extractor)";

/// Sends Overpass QL queries to an interpreter endpoint
pub struct OverpassClient {
    client: Client,
    url: Url,
}

impl OverpassClient {
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Run a query and return the raw response body
    pub async fn call(&self, query: &str) -> Result<String> {
        debug!("Overpass query: {}", query.trim());

        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("data", query)
            .finish();

        let response = self
            .client
            .post(self.url.clone())
            .header(
                CONTENT_TYPE,
                "application/x-www-form-urlencoded; charset=UTF-8",
            )
            .body(body)
            .send()
            .await
            .context("Overpass request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Overpass server responded with status {}", status);
        }

        let body = response.text().await?;
        info!("Overpass returned {} bytes", body.len());
        Ok(body)
    }
}

/// Overpass client that answers repeated queries from disk
pub struct CachedOverpass {
    client: OverpassClient,
    cache: ResponseCache,
}

impl CachedOverpass {
    pub fn new(client: OverpassClient, cache: ResponseCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Raw response body for `query`, fetched at most once
    pub async fn call(&self, query: &str) -> Result<String> {
        if let Some(body) = self.cache.get(query)? {
            debug!("Cache hit for query {}", ResponseCache::key(query));
            return Ok(body);
        }

        let body = self.client.call(query).await?;
        self.cache.put(query, &body)?;
        Ok(body)
    }

    /// Like [`CachedOverpass::call`], parsed as JSON
    pub async fn call_json<T: DeserializeOwned>(&self, query: &str) -> Result<T> {
        let body = self.call(query).await?;
        serde_json::from_str(&body).context("Failed to parse Overpass response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overpass::OverpassResponse;

    fn unreachable_client() -> OverpassClient {
        // Port 9 (discard) on localhost: any real request fails fast
        let url = Url::parse("http://127.0.0.1:9/api/interpreter").unwrap();
        OverpassClient::new(url, Duration::from_millis(200)).unwrap()
    }

    #[tokio::test]
    async fn test_cached_response_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path()).unwrap();
        let query = "[out:json];node(1);out;";
        cache
            .put(query, r#"{"elements":[{"type":"node","id":1,"lat":1.0,"lon":2.0}]}"#)
            .unwrap();

        let overpass = CachedOverpass::new(unreachable_client(), cache);
        let response: OverpassResponse = overpass.call_json(query).await.unwrap();
        assert_eq!(response.elements.len(), 1);
    }

    #[tokio::test]
    async fn test_uncached_query_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path()).unwrap();
        let overpass = CachedOverpass::new(unreachable_client(), cache);

        assert!(overpass.call("[out:json];node(2);out;").await.is_err());
        assert!(overpass.cache().get("[out:json];node(2);out;").unwrap().is_none());
    }
}

// HttpFetcher - reqwestによるHTTP GET

use super::Fetcher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

/// HTTP GETで本文を取得する実装
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("concurrent_tally/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request failed: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Unexpected HTTP status {status} for {url}");
        }

        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body: {url}"))?;
        Ok(body.to_vec())
    }
}

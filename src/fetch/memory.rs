// StaticFetcher - メモリ上のURL→本文マップ（テスト・オフライン用）

use super::Fetcher;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, Vec<u8>>,
    latency: Option<Duration>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    /// 各取得の前に待機する（並行性を引き出すため）
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<_> = self.bodies.keys().cloned().collect();
        urls.sort();
        urls
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No body registered for {url}"))
    }
}

// 取得レイヤー - 「URLを渡すと本文バイト列か失敗を返す」外部協調者

use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

pub mod http;
pub mod memory;

pub use http::HttpFetcher;
pub use memory::StaticFetcher;

/// 既定の取得対象（RFC 1000〜1019 の本文）
pub fn default_rfc_urls() -> Vec<String> {
    (1000..1020)
        .map(|number| format!("https://www.rfc-editor.org/rfc/rfc{number}.txt"))
        .collect()
}

/// リソース取得のトレイト
#[automock]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// URLの本文をバイト列で取得する
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl Fetcher for Box<dyn Fetcher> {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.as_ref().fetch(url).await
    }
}

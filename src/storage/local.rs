use super::{DirectoryEntry, DirectoryLister};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

/// ローカルファイルシステム用のディレクトリ列挙
#[derive(Debug, Clone, Default)]
pub struct LocalDirectoryLister;

impl LocalDirectoryLister {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DirectoryLister for LocalDirectoryLister {
    async fn list_entries(&self, directory: &Path) -> Result<Vec<DirectoryEntry>> {
        let mut entries = tokio::fs::read_dir(directory)
            .await
            .with_context(|| format!("Failed to read directory: {}", directory.display()))?;

        let mut listed = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("Failed to iterate directory: {}", directory.display()))?
        {
            // 種別が取れないエントリはディレクトリ扱いしない（名前の一致判定は行う）
            let is_directory = entry
                .file_type()
                .await
                .map(|file_type| file_type.is_dir())
                .unwrap_or(false);

            listed.push(DirectoryEntry {
                path: entry.path(),
                name: entry.file_name().to_string_lossy().into_owned(),
                is_directory,
            });
        }

        Ok(listed)
    }
}

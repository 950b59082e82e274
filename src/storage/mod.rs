use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use std::path::{Path, PathBuf};

pub mod local;

pub use local::LocalDirectoryLister;

/// ディレクトリ内の1エントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// エントリのフルパス
    pub path: PathBuf,
    /// エントリ名（ファイル名部分）
    pub name: String,
    /// エントリ自身がディレクトリかどうか（シンボリックリンクは辿らない）
    pub is_directory: bool,
}

impl DirectoryEntry {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, is_directory: bool) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            is_directory,
        }
    }
}

/// ディレクトリ列挙のトレイト
///
/// 権限エラーやOSエラーは `Err` として返し、呼び出し側でスキップする。
#[automock]
#[async_trait]
pub trait DirectoryLister: Send + Sync {
    /// 1階層分のエントリを列挙する
    async fn list_entries(&self, directory: &Path) -> Result<Vec<DirectoryEntry>>;
}

#[async_trait]
impl DirectoryLister for Box<dyn DirectoryLister> {
    async fn list_entries(&self, directory: &Path) -> Result<Vec<DirectoryEntry>> {
        self.as_ref().list_entries(directory).await
    }
}

// DirectorySearch - ディレクトリ木の並列走査
//
// 1ディレクトリの列挙を1ユニットとし、見つけたサブディレクトリは新しいユニットとして
// 同じディスパッチャへ投入する（単一スレッドで再帰しない）。

use crate::aggregator::Aggregator;
use crate::core::{ProcessingError, ProcessingResult, UnitOutcome, WorkItem};
use crate::engine::{UnitContext, WorkProcessor};
use crate::storage::DirectoryLister;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

/// 名前に対象文字列を含むエントリを集める処理系
pub struct DirectorySearch<L> {
    lister: Arc<L>,
    aggregator: Arc<Aggregator>,
    pattern: String,
}

impl<L> DirectorySearch<L>
where
    L: DirectoryLister + 'static,
{
    pub fn new(lister: Arc<L>, aggregator: Arc<Aggregator>, pattern: impl Into<String>) -> Self {
        Self {
            lister,
            aggregator,
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// 1ディレクトリ分の走査
    ///
    /// 一致判定は大文字小文字を区別するリテラル部分一致。
    pub async fn scan(&self, directory: &Path, ctx: &UnitContext) -> ProcessingResult<UnitOutcome> {
        if ctx.is_cancelled() {
            return Ok(UnitOutcome::Cancelled);
        }

        let entries = self
            .lister
            .list_entries(directory)
            .await
            .map_err(|e| ProcessingError::directory_listing(directory.display().to_string(), e))?;
        trace!(directory = %directory.display(), entries = entries.len(), "directory listed");

        for entry in entries {
            if ctx.is_cancelled() {
                return Ok(UnitOutcome::Cancelled);
            }

            if entry.name.contains(&self.pattern) {
                let hold = self.aggregator.record_match_timed(entry.path.clone())?;
                ctx.report_lock_held(hold).await;
            }

            if entry.is_directory {
                ctx.submit(WorkItem::DirectoryScan(entry.path))?;
            }
        }

        Ok(UnitOutcome::Completed)
    }
}

#[async_trait]
impl<L> WorkProcessor for DirectorySearch<L>
where
    L: DirectoryLister + 'static,
{
    fn name(&self) -> &'static str {
        "DirectorySearch"
    }

    async fn process(&self, item: &WorkItem, ctx: &UnitContext) -> ProcessingResult<UnitOutcome> {
        match item {
            WorkItem::DirectoryScan(directory) => self.scan(directory, ctx).await,
            other => Err(ProcessingError::unsupported_item(
                other.to_string(),
                self.name(),
            )),
        }
    }
}

// 集計エンジン - 依存性注入による実行API
// 走査・取得の各ジェネレータを1回の実行としてまとめ、join後のスナップショットだけを返す

use super::pipeline::RunPipeline;
use crate::{
    aggregator::{Aggregator, FrequencyTable},
    core::{PoolConfig, ProcessingError, ProcessingResult, ProgressReporter, RunSummary, WorkItem},
    fetch::Fetcher,
    generators::{DirectorySearch, LetterCounter},
    storage::DirectoryLister,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// ディレクトリ検索の結果
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub root: PathBuf,
    pub pattern: String,
    /// ロック取得順（実行ごとに異なる）
    pub matches: Vec<PathBuf>,
    pub summary: RunSummary,
    pub lock_acquisitions: u64,
}

/// 文字頻度集計の結果
#[derive(Debug, Clone, Serialize)]
pub struct LetterReport {
    pub frequencies: FrequencyTable,
    pub summary: RunSummary,
    pub lock_acquisitions: u64,
}

/// ディレクトリ木を並列に走査して名前一致エントリを集めるエンジン
///
/// 依存関係はコンストラクタで注入し、並列処理で共有するものはArcで保持する。
pub struct SearchEngine<L, C, R> {
    lister: Arc<L>,
    config: Arc<C>,
    reporter: Arc<R>,
    cancel: CancellationToken,
}

impl<L, C, R> SearchEngine<L, C, R>
where
    L: DirectoryLister + 'static,
    C: PoolConfig,
    R: ProgressReporter + 'static,
{
    pub fn new(lister: L, config: C, reporter: R) -> Self {
        Self {
            lister: Arc::new(lister),
            config: Arc::new(config),
            reporter: Arc::new(reporter),
            cancel: CancellationToken::new(),
        }
    }

    /// 外部から実行を打ち切れるようにトークンを差し替える
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// `root` 以下を走査し、名前に `pattern` を含むエントリを返す
    pub async fn search(&self, root: &Path, pattern: &str) -> ProcessingResult<SearchReport> {
        validate_root(root).await?;

        let aggregator = Arc::new(Aggregator::new());
        let processor = Arc::new(DirectorySearch::new(
            Arc::clone(&self.lister),
            Arc::clone(&aggregator),
            pattern,
        ));

        let summary = RunPipeline::new(processor)
            .execute(
                vec![WorkItem::directory_scan(root)],
                None,
                self.config.as_ref(),
                Arc::clone(&self.reporter) as Arc<dyn ProgressReporter>,
                self.cancel.clone(),
            )
            .await?;

        let snapshot = aggregator.snapshot()?;
        debug!(
            root = %root.display(),
            matches = snapshot.matches.len(),
            "search finished"
        );

        Ok(SearchReport {
            root: root.to_path_buf(),
            pattern: pattern.to_string(),
            matches: snapshot.matches,
            summary,
            lock_acquisitions: snapshot.lock_acquisitions,
        })
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }
}

/// URL群の本文を並列に取得して文字頻度を集計するエンジン
pub struct LetterCountEngine<F, C, R> {
    fetcher: Arc<F>,
    config: Arc<C>,
    reporter: Arc<R>,
    cancel: CancellationToken,
}

impl<F, C, R> LetterCountEngine<F, C, R>
where
    F: Fetcher + 'static,
    C: PoolConfig,
    R: ProgressReporter + 'static,
{
    pub fn new(fetcher: F, config: C, reporter: R) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            config: Arc::new(config),
            reporter: Arc::new(reporter),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 全URLを1ユニットずつ投入し、join後の頻度表を返す
    ///
    /// 取得に失敗したURLは集計に含まれず、`summary.failed_units` に数えられる。
    pub async fn count(&self, urls: Vec<String>) -> ProcessingResult<LetterReport> {
        let aggregator = Arc::new(Aggregator::new());
        let processor = Arc::new(LetterCounter::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&aggregator),
        ));

        let expected_units = urls.len();
        let seeds = urls.into_iter().map(WorkItem::FetchAndCount).collect();
        let summary = RunPipeline::new(processor)
            .execute(
                seeds,
                Some(expected_units),
                self.config.as_ref(),
                Arc::clone(&self.reporter) as Arc<dyn ProgressReporter>,
                self.cancel.clone(),
            )
            .await?;

        let snapshot = aggregator.snapshot()?;
        Ok(LetterReport {
            frequencies: snapshot.frequencies,
            summary,
            lock_acquisitions: snapshot.lock_acquisitions,
        })
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }
}

/// 走査開始前のルート検証（存在しない・ディレクトリでない場合は即エラー）
async fn validate_root(root: &Path) -> ProcessingResult<()> {
    let root_display = root.display().to_string();
    let metadata = tokio::fs::metadata(root)
        .await
        .map_err(|e| ProcessingError::invalid_root(root_display.clone(), e.to_string()))?;

    if !metadata.is_dir() {
        return Err(ProcessingError::invalid_root(
            root_display,
            "ディレクトリではありません",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetcher;
    use crate::services::{DefaultPoolConfig, NoOpProgressReporter};
    use crate::storage::LocalDirectoryLister;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_config(workers: usize) -> DefaultPoolConfig {
        DefaultPoolConfig::new(workers).with_progress_reporting(false)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_search_finds_nested_matches() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp_dir.path().join("README.md"), "top").unwrap();
        fs::write(nested.join("README.md"), "deep").unwrap();
        fs::write(nested.join("notes.txt"), "other").unwrap();

        let engine = SearchEngine::new(
            LocalDirectoryLister::new(),
            quiet_config(4),
            NoOpProgressReporter::new(),
        );
        let report = engine.search(temp_dir.path(), "README.md").await.unwrap();

        let mut matches = report.matches.clone();
        matches.sort();
        assert_eq!(
            matches,
            vec![temp_dir.path().join("README.md"), nested.join("README.md")]
        );
        // root, a, a/b
        assert_eq!(report.summary.submitted_units, 3);
        assert!(report.summary.is_complete());
        assert_eq!(report.lock_acquisitions, 2);
    }

    #[tokio::test]
    async fn test_search_rejects_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let engine = SearchEngine::new(
            LocalDirectoryLister::new(),
            quiet_config(1),
            NoOpProgressReporter::new(),
        );

        let result = engine
            .search(&temp_dir.path().join("missing"), "README.md")
            .await;
        assert!(matches!(result, Err(ProcessingError::InvalidRoot { .. })));
    }

    #[tokio::test]
    async fn test_search_rejects_file_root() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        let engine = SearchEngine::new(
            LocalDirectoryLister::new(),
            quiet_config(1),
            NoOpProgressReporter::new(),
        );
        let result = engine.search(&file, "file").await;
        assert!(matches!(result, Err(ProcessingError::InvalidRoot { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_count_sums_all_bodies() {
        let fetcher = StaticFetcher::new()
            .with_body("mem://1", "Hello, World!")
            .with_body("mem://2", "RFC 1000: abc")
            .with_body("mem://3", "");

        let engine = LetterCountEngine::new(fetcher, quiet_config(3), NoOpProgressReporter::new());
        let report = engine
            .count(vec![
                "mem://1".to_string(),
                "mem://2".to_string(),
                "mem://3".to_string(),
            ])
            .await
            .unwrap();

        // helloworld(10) + rfcabc(6)
        assert_eq!(report.frequencies.total(), 16);
        assert_eq!(report.frequencies.get('l'), Some(3));
        assert_eq!(report.frequencies.get('c'), Some(2));
        assert_eq!(report.summary.expected_units, Some(3));
        assert_eq!(report.summary.succeeded_units, 3);
        assert_eq!(report.lock_acquisitions, 3);
    }

    #[tokio::test]
    async fn test_count_with_unknown_url_counts_failure() {
        let fetcher = StaticFetcher::new().with_body("mem://known", "aaa");
        let engine = LetterCountEngine::new(fetcher, quiet_config(2), NoOpProgressReporter::new());

        let report = engine
            .count(vec!["mem://known".to_string(), "mem://unknown".to_string()])
            .await
            .unwrap();

        assert_eq!(report.frequencies.get('a'), Some(3));
        assert_eq!(report.summary.failed_units, 1);
        assert!(!report.summary.is_complete());
    }

    #[tokio::test]
    async fn test_count_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let fetcher = StaticFetcher::new().with_body("mem://a", "abc");
        let engine = LetterCountEngine::new(fetcher, quiet_config(2), NoOpProgressReporter::new())
            .with_cancellation(cancel);
        let report = engine.count(vec!["mem://a".to_string()]).await.unwrap();

        assert_eq!(report.summary.cancelled_units, 1);
        assert_eq!(report.frequencies.total(), 0);
        assert_eq!(report.lock_acquisitions, 0);
    }
}

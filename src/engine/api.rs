// 高レベル公開API
// エンジンを簡単に組み立てて使うための便利な関数

use super::{LetterCountEngine, LetterReport, SearchEngine, SearchReport};
use crate::{
    core::{PoolConfig, ProcessingError, ProcessingResult, ProgressReporter},
    fetch::{Fetcher, HttpFetcher},
    services::{ConsoleProgressReporter, DefaultPoolConfig, NoOpProgressReporter},
    storage::{DirectoryLister, LocalDirectoryLister},
};
use std::path::Path;

// ========================================
// DI対応API - エンジンベース
// ========================================

/// 設定済みエンジンでディレクトリを検索
pub async fn search_with_engine<L, C, R>(
    root: &Path,
    pattern: &str,
    engine: &SearchEngine<L, C, R>,
) -> ProcessingResult<SearchReport>
where
    L: DirectoryLister + 'static,
    C: PoolConfig,
    R: ProgressReporter + 'static,
{
    engine.search(root, pattern).await
}

/// 設定済みエンジンでURL群の文字頻度を集計
pub async fn count_with_engine<F, C, R>(
    urls: Vec<String>,
    engine: &LetterCountEngine<F, C, R>,
) -> ProcessingResult<LetterReport>
where
    F: Fetcher + 'static,
    C: PoolConfig,
    R: ProgressReporter + 'static,
{
    engine.count(urls).await
}

/// ローカルファイルシステム用の検索エンジン（コンソール出力あり）
pub fn create_default_search_engine(
) -> SearchEngine<LocalDirectoryLister, DefaultPoolConfig, ConsoleProgressReporter> {
    SearchEngine::new(
        LocalDirectoryLister::new(),
        DefaultPoolConfig::default(),
        ConsoleProgressReporter::new(),
    )
}

/// 静音版の検索エンジン
pub fn create_quiet_search_engine(
) -> SearchEngine<LocalDirectoryLister, DefaultPoolConfig, NoOpProgressReporter> {
    SearchEngine::new(
        LocalDirectoryLister::new(),
        DefaultPoolConfig::default(),
        NoOpProgressReporter::new(),
    )
}

/// HTTP取得を使う集計エンジン
///
/// 取得タイムアウトは設定の `fetch_timeout` を使う。
pub fn create_http_letter_engine<C, R>(
    config: C,
    reporter: R,
) -> ProcessingResult<LetterCountEngine<HttpFetcher, C, R>>
where
    C: PoolConfig,
    R: ProgressReporter + 'static,
{
    let fetcher = HttpFetcher::new(config.fetch_timeout()).map_err(ProcessingError::internal)?;
    Ok(LetterCountEngine::new(fetcher, config, reporter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetcher;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_search_with_quiet_engine() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("docs")).unwrap();
        fs::write(temp_dir.path().join("docs").join("README.md"), "x").unwrap();

        let engine = create_quiet_search_engine();
        let report = search_with_engine(temp_dir.path(), "README", &engine)
            .await
            .unwrap();

        assert_eq!(
            report.matches,
            vec![temp_dir.path().join("docs").join("README.md")]
        );
        assert_eq!(report.pattern, "README");
    }

    #[tokio::test]
    async fn test_count_with_static_engine() {
        let engine = LetterCountEngine::new(
            StaticFetcher::new().with_body("mem://z", "zzZ!"),
            DefaultPoolConfig::new(1).with_progress_reporting(false),
            NoOpProgressReporter::new(),
        );

        let report = count_with_engine(vec!["mem://z".to_string()], &engine)
            .await
            .unwrap();
        assert_eq!(report.frequencies.get('z'), Some(3));
    }

    #[test]
    fn test_create_http_letter_engine_uses_config() {
        let engine = create_http_letter_engine(
            DefaultPoolConfig::new(3).with_fetch_timeout(Duration::from_secs(7)),
            NoOpProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(engine.config().worker_count(), 3);
        assert_eq!(engine.config().fetch_timeout(), Duration::from_secs(7));
    }

    #[test]
    fn test_default_search_engine_has_workers() {
        let engine = create_default_search_engine();
        assert!(engine.config().worker_count() >= 4);
    }
}

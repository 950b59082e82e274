// 集計エンジンのトレイト定義
// 設定と進捗報告の抽象化インターフェース

use super::types::{LockHold, RunSummary, WorkItem};
use async_trait::async_trait;
use mockall::automock;
use std::sync::Arc;
use std::time::Duration;

/// ワーカープールの設定を抽象化するトレイト
#[automock]
pub trait PoolConfig: Send + Sync {
    /// 同時実行ワーカー数を取得
    fn worker_count(&self) -> usize;

    /// 1回の取得に許す最大時間
    fn fetch_timeout(&self) -> Duration;

    /// 進捗報告を有効にするかどうか
    fn enable_progress_reporting(&self) -> bool;
}

impl PoolConfig for Box<dyn PoolConfig> {
    fn worker_count(&self) -> usize {
        self.as_ref().worker_count()
    }

    fn fetch_timeout(&self) -> Duration {
        self.as_ref().fetch_timeout()
    }

    fn enable_progress_reporting(&self) -> bool {
        self.as_ref().enable_progress_reporting()
    }
}

/// 進捗報告の抽象化トレイト
///
/// ワーカーから並行に呼ばれるため、実装は内部で同期すること。
#[automock]
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// 実行開始時の報告（総数が事前に分かる場合のみ `Some`）
    async fn report_started(&self, expected_units: Option<usize>);

    /// ワーカーがユニットに着手した
    async fn report_unit_started(&self, worker_id: usize, item: &WorkItem);

    /// 本文の取得が終わった（集計の前）
    async fn report_fetch_completed(&self, worker_id: usize, item: &WorkItem, bytes: usize);

    /// 集計器のロックを保持した区間
    async fn report_lock_held(&self, worker_id: usize, item: &WorkItem, hold: LockHold);

    /// ユニット完了（成功・失敗・キャンセルを問わない）
    async fn report_unit_finished(&self, worker_id: usize, item: &WorkItem, finished: usize);

    /// ユニット内で発生したエラーの報告
    async fn report_error(&self, worker_id: usize, item: &WorkItem, error: &str);

    /// join完了後の報告
    async fn report_completed(&self, summary: &RunSummary);
}

#[async_trait]
impl ProgressReporter for Box<dyn ProgressReporter> {
    async fn report_started(&self, expected_units: Option<usize>) {
        self.as_ref().report_started(expected_units).await
    }

    async fn report_unit_started(&self, worker_id: usize, item: &WorkItem) {
        self.as_ref().report_unit_started(worker_id, item).await
    }

    async fn report_fetch_completed(&self, worker_id: usize, item: &WorkItem, bytes: usize) {
        self.as_ref()
            .report_fetch_completed(worker_id, item, bytes)
            .await
    }

    async fn report_lock_held(&self, worker_id: usize, item: &WorkItem, hold: LockHold) {
        self.as_ref().report_lock_held(worker_id, item, hold).await
    }

    async fn report_unit_finished(&self, worker_id: usize, item: &WorkItem, finished: usize) {
        self.as_ref()
            .report_unit_finished(worker_id, item, finished)
            .await
    }

    async fn report_error(&self, worker_id: usize, item: &WorkItem, error: &str) {
        self.as_ref().report_error(worker_id, item, error).await
    }

    async fn report_completed(&self, summary: &RunSummary) {
        self.as_ref().report_completed(summary).await
    }
}

/// 実行後に中身を読み出したい報告器（タイムラインなど）を共有するための実装
#[async_trait]
impl<T> ProgressReporter for Arc<T>
where
    T: ProgressReporter + ?Sized,
{
    async fn report_started(&self, expected_units: Option<usize>) {
        self.as_ref().report_started(expected_units).await
    }

    async fn report_unit_started(&self, worker_id: usize, item: &WorkItem) {
        self.as_ref().report_unit_started(worker_id, item).await
    }

    async fn report_fetch_completed(&self, worker_id: usize, item: &WorkItem, bytes: usize) {
        self.as_ref()
            .report_fetch_completed(worker_id, item, bytes)
            .await
    }

    async fn report_lock_held(&self, worker_id: usize, item: &WorkItem, hold: LockHold) {
        self.as_ref().report_lock_held(worker_id, item, hold).await
    }

    async fn report_unit_finished(&self, worker_id: usize, item: &WorkItem, finished: usize) {
        self.as_ref()
            .report_unit_finished(worker_id, item, finished)
            .await
    }

    async fn report_error(&self, worker_id: usize, item: &WorkItem, error: &str) {
        self.as_ref().report_error(worker_id, item, error).await
    }

    async fn report_completed(&self, summary: &RunSummary) {
        self.as_ref().report_completed(summary).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;

    #[test]
    fn test_pool_config_mock() {
        let mut mock_config = MockPoolConfig::new();
        mock_config.expect_worker_count().return_const(8usize);
        mock_config
            .expect_fetch_timeout()
            .return_const(Duration::from_secs(3));
        mock_config.expect_enable_progress_reporting().return_const(false);

        let config: Box<dyn PoolConfig> = Box::new(mock_config);
        assert_eq!(config.worker_count(), 8);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(3));
        assert!(!config.enable_progress_reporting());
    }

    #[tokio::test]
    async fn test_progress_reporter_mock_through_box() {
        let mut mock_reporter = MockProgressReporter::new();
        mock_reporter
            .expect_report_started()
            .with(eq(Some(20)))
            .times(1)
            .return_const(());
        mock_reporter
            .expect_report_error()
            .withf(|worker_id, item, error| {
                *worker_id == 2 && item.kind() == "fetch_and_count" && error.contains("404")
            })
            .times(1)
            .return_const(());

        let reporter: Box<dyn ProgressReporter> = Box::new(mock_reporter);
        reporter.report_started(Some(20)).await;
        reporter
            .report_error(2, &WorkItem::fetch_and_count("https://example.com"), "HTTP 404")
            .await;
    }
}

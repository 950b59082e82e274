// Pipeline - 1回の実行のオーケストレーション
// 起動 → 種投入 → join → 停止 → サマリー作成

use super::pool::WorkerPool;
use super::worker::WorkProcessor;
use crate::core::{PoolConfig, ProcessingResult, ProgressReporter, RunSummary, WorkItem};
use crate::services::NoOpProgressReporter;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// 処理系を1つ受け取り、1回の実行を最後まで管理するパイプライン
pub struct RunPipeline<P> {
    processor: Arc<P>,
}

impl<P> RunPipeline<P>
where
    P: WorkProcessor,
{
    pub fn new(processor: Arc<P>) -> Self {
        Self { processor }
    }

    /// 種となる作業を投入し、全ユニット完了まで待ってサマリーを返す
    ///
    /// 戻り値を受け取った時点で、処理系が持つ集計器は読み出してよい。
    pub async fn execute<C>(
        &self,
        seeds: Vec<WorkItem>,
        expected_units: Option<usize>,
        config: &C,
        reporter: Arc<dyn ProgressReporter>,
        cancel: CancellationToken,
    ) -> ProcessingResult<RunSummary>
    where
        C: PoolConfig + ?Sized,
    {
        let start_time = Instant::now();
        let reporter: Arc<dyn ProgressReporter> = if config.enable_progress_reporting() {
            reporter
        } else {
            Arc::new(NoOpProgressReporter::new())
        };

        let pool = WorkerPool::start_with_cancellation(
            Arc::clone(&self.processor),
            Arc::clone(&reporter),
            config.worker_count(),
            cancel,
        )?;
        reporter.report_started(expected_units).await;

        for seed in seeds {
            pool.submit(seed)?;
        }
        pool.join().await?;

        let stats = pool.stats();
        let summary = RunSummary {
            expected_units,
            submitted_units: stats.submitted(),
            succeeded_units: stats.succeeded(),
            failed_units: stats.failed(),
            cancelled_units: stats.cancelled(),
            worker_count: pool.worker_count(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };
        pool.shutdown().await?;

        info!(
            processor = self.processor.name(),
            submitted = summary.submitted_units,
            succeeded = summary.succeeded_units,
            failed = summary.failed_units,
            cancelled = summary.cancelled_units,
            elapsed_ms = summary.elapsed_ms,
            "run finished"
        );
        reporter.report_completed(&summary).await;

        Ok(summary)
    }
}

// WorkerPool - 固定数ワーカーと完了バリア(join)

use super::dispatcher::{DispatchShared, UnitStats, WorkSpawner};
use super::worker::{spawn_workers, WorkProcessor, WorkerHandles};
use crate::core::{ProcessingError, ProcessingResult, ProgressReporter, WorkItem};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// 固定サイズのワーカープール
///
/// 実行中のユニットからの再投入を受け付け、`join` は再帰的に生まれた作業も含めて待つ。
pub struct WorkerPool {
    shared: Arc<DispatchShared>,
    handles: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
    shutdown: CancellationToken,
    worker_count: usize,
}

impl WorkerPool {
    /// ワーカーを起動する（tokioランタイム内で呼ぶこと）
    pub fn start<P>(
        processor: Arc<P>,
        reporter: Arc<dyn ProgressReporter>,
        worker_count: usize,
    ) -> ProcessingResult<Self>
    where
        P: WorkProcessor,
    {
        Self::start_with_cancellation(processor, reporter, worker_count, CancellationToken::new())
    }

    /// 外部のキャンセルトークンを共有して起動する
    pub fn start_with_cancellation<P>(
        processor: Arc<P>,
        reporter: Arc<dyn ProgressReporter>,
        worker_count: usize,
        cancel: CancellationToken,
    ) -> ProcessingResult<Self>
    where
        P: WorkProcessor,
    {
        if worker_count == 0 {
            return Err(ProcessingError::configuration(
                "ワーカー数は1以上である必要があります",
            ));
        }

        let (shared, queue_rx) = DispatchShared::new();
        let shutdown = CancellationToken::new();
        let worker_handles = WorkerHandles {
            shared: Arc::clone(&shared),
            queue_rx: Arc::new(Mutex::new(queue_rx)),
            reporter,
            cancel: cancel.clone(),
            shutdown: shutdown.clone(),
        };
        let handles = spawn_workers(processor, &worker_handles, worker_count);
        debug!(worker_count, "worker pool started");

        Ok(Self {
            shared,
            handles,
            cancel,
            shutdown,
            worker_count,
        })
    }

    /// 非ブロッキングで作業を投入する
    pub fn submit(&self, item: WorkItem) -> ProcessingResult<()> {
        self.spawner().submit(item)
    }

    pub fn spawner(&self) -> WorkSpawner {
        WorkSpawner::new(Arc::clone(&self.shared))
    }

    /// 投入済み・再帰的に生まれた全ユニットが完了するまで待機
    ///
    /// 戻った時点で、全ユニットによる変更が呼び出し側から見える。
    pub async fn join(&self) -> ProcessingResult<()> {
        self.shared.wait_idle().await
    }

    /// 実行中のユニットにキャンセルを要求する
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn stats(&self) -> &UnitStats {
        &self.shared.stats
    }

    pub fn outstanding(&self) -> usize {
        self.shared.outstanding()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// アイドル状態のワーカーを停止し、終了を待つ
    pub async fn shutdown(mut self) -> ProcessingResult<()> {
        self.shutdown.cancel();
        for handle in std::mem::take(&mut self.handles) {
            handle.await?;
        }
        debug!(worker_count = self.worker_count, "worker pool stopped");
        Ok(())
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

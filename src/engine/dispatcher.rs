// Dispatcher - 作業キューと未完了ユニットカウンター
//
// カウンターは投入時に加算、完了時に減算する。キュー長は完了判定に使わない。

use crate::core::{ProcessingError, ProcessingResult, WorkItem};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::trace;

/// ユニット単位の統計（集計器のロックとは独立）
#[derive(Debug, Default)]
pub struct UnitStats {
    submitted: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    cancelled: AtomicUsize,
}

impl UnitStats {
    pub(crate) fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// 完了済み（成功・失敗・キャンセル）ユニット数
    pub fn finished(&self) -> usize {
        self.succeeded() + self.failed() + self.cancelled()
    }
}

pub(crate) struct DispatchShared {
    queue_tx: mpsc::UnboundedSender<WorkItem>,
    outstanding: watch::Sender<usize>,
    pub(crate) stats: UnitStats,
}

impl DispatchShared {
    pub(crate) fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<WorkItem>) {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (outstanding, _) = watch::channel(0);
        let shared = Arc::new(Self {
            queue_tx,
            outstanding,
            stats: UnitStats::default(),
        });
        (shared, queue_rx)
    }

    fn submit(&self, item: WorkItem) -> ProcessingResult<()> {
        // ワーカーが先に完了・減算できないよう、送信前に加算する
        self.outstanding.send_modify(|count| *count += 1);

        if let Err(mpsc::error::SendError(item)) = self.queue_tx.send(item) {
            self.complete();
            return Err(ProcessingError::dispatcher_closed(format!(
                "{item} を投入できません"
            )));
        }

        self.stats.submitted.fetch_add(1, Ordering::Relaxed);
        trace!(outstanding = *self.outstanding.borrow(), "unit submitted");
        Ok(())
    }

    fn complete(&self) {
        self.outstanding.send_modify(|count| {
            debug_assert!(*count > 0, "outstanding counter underflow");
            *count = count.saturating_sub(1);
        });
    }

    pub(crate) fn outstanding(&self) -> usize {
        *self.outstanding.borrow()
    }

    /// 未完了数が0になるまで待機
    pub(crate) async fn wait_idle(&self) -> ProcessingResult<()> {
        let mut rx = self.outstanding.subscribe();
        rx.wait_for(|count| *count == 0)
            .await
            .map(|_| ())
            .map_err(|_| ProcessingError::dispatcher_closed("未完了カウンターが破棄されました"))
    }
}

/// ユニット内から追加の作業を投入するためのハンドル
///
/// プールがキューを所有し、ユニットは投入のためにハンドルを借りるだけ。
#[derive(Clone)]
pub struct WorkSpawner {
    shared: Arc<DispatchShared>,
}

impl WorkSpawner {
    pub(crate) fn new(shared: Arc<DispatchShared>) -> Self {
        Self { shared }
    }

    /// 非ブロッキングで作業を投入する
    pub fn submit(&self, item: WorkItem) -> ProcessingResult<()> {
        self.shared.submit(item)
    }

    /// 現在の未完了ユニット数
    pub fn outstanding(&self) -> usize {
        self.shared.outstanding()
    }
}

/// ユニット完了時に未完了カウンターを減算するRAIIガード
///
/// ユニットがパニックしても `Drop` で必ず減算される。
pub(crate) struct CompletionGuard {
    shared: Arc<DispatchShared>,
}

impl CompletionGuard {
    pub(crate) fn new(shared: Arc<DispatchShared>) -> Self {
        Self { shared }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.shared.complete();
    }
}

// Worker - キューから作業を取り出して実行するワーカー

use super::dispatcher::{CompletionGuard, DispatchShared, WorkSpawner};
use crate::core::{
    LockHold, ProcessingError, ProcessingResult, ProgressReporter, UnitOutcome, WorkItem,
};
use async_trait::async_trait;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// 作業ユニットを実行する処理系
#[async_trait]
pub trait WorkProcessor: Send + Sync + 'static {
    /// ログ・エラー表示用の名前
    fn name(&self) -> &'static str;

    /// 1ユニットを実行する
    ///
    /// ユニット単位の回復可能なエラーは `Err` で返せばよい。ワーカーが記録して握りつぶす。
    async fn process(&self, item: &WorkItem, ctx: &UnitContext) -> ProcessingResult<UnitOutcome>;
}

/// 実行中ユニットに渡される能力（追加投入・キャンセル確認・途中経過の報告）
#[derive(Clone)]
pub struct UnitContext {
    worker_id: usize,
    item: WorkItem,
    spawner: WorkSpawner,
    reporter: Arc<dyn ProgressReporter>,
    cancel: CancellationToken,
}

impl UnitContext {
    pub(crate) fn new(
        worker_id: usize,
        item: WorkItem,
        spawner: WorkSpawner,
        reporter: Arc<dyn ProgressReporter>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            worker_id,
            item,
            spawner,
            reporter,
            cancel,
        }
    }

    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// 実行中のユニット
    pub fn item(&self) -> &WorkItem {
        &self.item
    }

    pub async fn report_fetch_completed(&self, bytes: usize) {
        self.reporter
            .report_fetch_completed(self.worker_id, &self.item, bytes)
            .await;
    }

    pub async fn report_lock_held(&self, hold: LockHold) {
        self.reporter
            .report_lock_held(self.worker_id, &self.item, hold)
            .await;
    }

    /// 同じディスパッチャへ作業を追加投入する
    pub fn submit(&self, item: WorkItem) -> ProcessingResult<()> {
        self.spawner.submit(item)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

pub(crate) struct WorkerHandles {
    pub(crate) shared: Arc<DispatchShared>,
    pub(crate) queue_rx: Arc<Mutex<mpsc::UnboundedReceiver<WorkItem>>>,
    pub(crate) reporter: Arc<dyn ProgressReporter>,
    pub(crate) cancel: CancellationToken,
    pub(crate) shutdown: CancellationToken,
}

/// 単一ワーカー
pub(crate) fn spawn_single_worker<P>(
    worker_id: usize,
    processor: Arc<P>,
    handles: &WorkerHandles,
) -> JoinHandle<()>
where
    P: WorkProcessor,
{
    let shared = Arc::clone(&handles.shared);
    let queue_rx = Arc::clone(&handles.queue_rx);
    let reporter = Arc::clone(&handles.reporter);
    let cancel = handles.cancel.clone();
    let shutdown = handles.shutdown.clone();

    tokio::spawn(async move {
        loop {
            let item = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                item = async { queue_rx.lock().await.recv().await } => match item {
                    Some(item) => item,
                    None => break,
                },
            };

            // 統計と報告を済ませてから減算されるよう、ループ末尾まで保持する
            let _guard = CompletionGuard::new(Arc::clone(&shared));
            {
                let reporter = Arc::clone(&reporter);
                let item = item.clone();
                isolate_report(worker_id, "unit_started", async move {
                    reporter.report_unit_started(worker_id, &item).await;
                })
                .await;
            }

            let ctx = UnitContext::new(
                worker_id,
                item.clone(),
                WorkSpawner::new(Arc::clone(&shared)),
                Arc::clone(&reporter),
                cancel.clone(),
            );
            match run_unit(Arc::clone(&processor), item.clone(), ctx).await {
                Ok(UnitOutcome::Completed) => {
                    shared.stats.record_success();
                    debug!(worker_id, %item, "unit completed");
                }
                Ok(UnitOutcome::Cancelled) => {
                    shared.stats.record_cancelled();
                    debug!(worker_id, %item, "unit cancelled");
                }
                Err(err) => {
                    shared.stats.record_failure();
                    if err.is_recoverable() {
                        debug!(worker_id, %item, error = %err, "unit failed, skipping");
                    } else {
                        error!(
                            worker_id,
                            %item,
                            processor = processor.name(),
                            severity = err.severity().as_str(),
                            error = %err,
                            "unit failed with fatal error"
                        );
                    }
                    let reporter = Arc::clone(&reporter);
                    let item = item.clone();
                    let message = err.to_string();
                    isolate_report(worker_id, "error", async move {
                        reporter.report_error(worker_id, &item, &message).await;
                    })
                    .await;
                }
            }

            let finished = shared.stats.finished();
            let reporter = Arc::clone(&reporter);
            isolate_report(worker_id, "unit_finished", async move {
                reporter.report_unit_finished(worker_id, &item, finished).await;
            })
            .await;
        }
    })
}

/// ワーカープール
pub(crate) fn spawn_workers<P>(
    processor: Arc<P>,
    handles: &WorkerHandles,
    worker_count: usize,
) -> Vec<JoinHandle<()>>
where
    P: WorkProcessor,
{
    (0..worker_count)
        .map(|worker_id| spawn_single_worker(worker_id, Arc::clone(&processor), handles))
        .collect()
}

/// ユニットを別タスクで実行し、パニックをエラーに変換する
async fn run_unit<P>(
    processor: Arc<P>,
    item: WorkItem,
    ctx: UnitContext,
) -> ProcessingResult<UnitOutcome>
where
    P: WorkProcessor,
{
    let task = tokio::spawn(async move { processor.process(&item, &ctx).await });
    match task.await {
        Ok(result) => result,
        Err(join_error) if join_error.is_panic() => Err(ProcessingError::unit_panicked(
            panic_message(join_error.into_panic()),
        )),
        Err(join_error) => Err(ProcessingError::task(join_error)),
    }
}

/// 進捗報告を別タスクで実行する
///
/// 報告器がパニックしてもワーカーは止めずに次のユニットへ進む。
async fn isolate_report<F>(worker_id: usize, stage: &'static str, report: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Err(join_error) = tokio::spawn(report).await {
        if join_error.is_panic() {
            error!(
                worker_id,
                stage,
                panic = %panic_message(join_error.into_panic()),
                "progress reporter panicked, worker continues"
            );
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RunSummary;
    use crate::services::NoOpProgressReporter;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::timeout;

    /// 着手報告のたびにパニックする報告器
    #[derive(Default)]
    struct ExplodingReporter {
        started_calls: AtomicUsize,
    }

    #[async_trait]
    impl ProgressReporter for ExplodingReporter {
        async fn report_started(&self, _expected_units: Option<usize>) {}

        async fn report_unit_started(&self, _worker_id: usize, _item: &WorkItem) {
            self.started_calls.fetch_add(1, Ordering::SeqCst);
            panic!("報告器の不具合");
        }

        async fn report_fetch_completed(&self, _worker_id: usize, _item: &WorkItem, _bytes: usize) {}

        async fn report_lock_held(&self, _worker_id: usize, _item: &WorkItem, _hold: LockHold) {}

        async fn report_unit_finished(&self, _worker_id: usize, _item: &WorkItem, _finished: usize) {}

        async fn report_error(&self, _worker_id: usize, _item: &WorkItem, _error: &str) {}

        async fn report_completed(&self, _summary: &RunSummary) {}
    }

    struct Succeeding;

    #[async_trait]
    impl WorkProcessor for Succeeding {
        fn name(&self) -> &'static str {
            "Succeeding"
        }

        async fn process(&self, _item: &WorkItem, _ctx: &UnitContext) -> ProcessingResult<UnitOutcome> {
            Ok(UnitOutcome::Completed)
        }
    }

    #[tokio::test]
    async fn test_panicking_reporter_does_not_stop_worker() {
        let (shared, queue_rx) = DispatchShared::new();
        let reporter = Arc::new(ExplodingReporter::default());
        let shutdown = CancellationToken::new();
        let handles = WorkerHandles {
            shared: Arc::clone(&shared),
            queue_rx: Arc::new(Mutex::new(queue_rx)),
            reporter: Arc::clone(&reporter) as Arc<dyn ProgressReporter>,
            cancel: CancellationToken::new(),
            shutdown: shutdown.clone(),
        };
        let workers = spawn_workers(Arc::new(Succeeding), &handles, 1);

        let spawner = WorkSpawner::new(Arc::clone(&shared));
        spawner.submit(WorkItem::fetch_and_count("mem://first")).unwrap();
        spawner.submit(WorkItem::fetch_and_count("mem://second")).unwrap();

        timeout(Duration::from_secs(5), shared.wait_idle())
            .await
            .expect("報告器がパニックしてもjoinは戻るべきです")
            .unwrap();

        assert_eq!(reporter.started_calls.load(Ordering::SeqCst), 2);
        assert_eq!(shared.stats.succeeded(), 2);

        shutdown.cancel();
        for worker in workers {
            worker.await.expect("ワーカー自体はパニックしていないべきです");
        }
    }

    #[test]
    fn test_panic_message_extraction() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(42u8)), "unknown panic payload");
    }

    #[tokio::test]
    async fn test_unit_context_reports_cancellation() {
        let (shared, _queue_rx) = DispatchShared::new();
        let cancel = CancellationToken::new();
        let ctx = UnitContext::new(
            3,
            WorkItem::directory_scan("/srv"),
            WorkSpawner::new(shared),
            Arc::new(NoOpProgressReporter::new()),
            cancel.clone(),
        );

        assert_eq!(ctx.worker_id(), 3);
        assert_eq!(ctx.item(), &WorkItem::directory_scan("/srv"));
        assert!(!ctx.is_cancelled());
        cancel.cancel();
        assert!(ctx.is_cancelled());
    }
}

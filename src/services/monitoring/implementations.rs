// 進捗監視の具象実装

use crate::core::{LockHold, ProgressReporter, RunSummary, WorkItem};
use async_trait::async_trait;

/// コンソール出力による進捗報告実装
///
/// ユニット単位の着手は表示せず、完了数の節目とエラーだけを出力する。
#[derive(Debug, Default, Clone)]
pub struct ConsoleProgressReporter {
    quiet: bool,
}

impl ConsoleProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

#[async_trait]
impl ProgressReporter for ConsoleProgressReporter {
    async fn report_started(&self, expected_units: Option<usize>) {
        if self.quiet {
            return;
        }
        match expected_units {
            Some(total) => println!("🚀 Starting run with {total} units..."),
            None => println!("🚀 Starting run (unit count discovered while running)..."),
        }
    }

    async fn report_unit_started(&self, _worker_id: usize, _item: &WorkItem) {}

    async fn report_fetch_completed(&self, _worker_id: usize, _item: &WorkItem, _bytes: usize) {}

    async fn report_lock_held(&self, _worker_id: usize, _item: &WorkItem, _hold: LockHold) {}

    async fn report_unit_finished(&self, _worker_id: usize, _item: &WorkItem, finished: usize) {
        if !self.quiet && finished % 100 == 0 {
            println!("📊 Progress: {finished} units finished");
        }
    }

    async fn report_error(&self, worker_id: usize, item: &WorkItem, error: &str) {
        if !self.quiet {
            eprintln!("❌ Error processing {item} (worker {worker_id}): {error}");
        }
    }

    async fn report_completed(&self, summary: &RunSummary) {
        if !self.quiet {
            println!(
                "✅ Completed! Succeeded: {}, Failed: {}, Cancelled: {} ({} ms)",
                summary.succeeded_units,
                summary.failed_units,
                summary.cancelled_units,
                summary.elapsed_ms
            );
        }
    }
}

/// 何もしない進捗報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn report_started(&self, _expected_units: Option<usize>) {}

    async fn report_unit_started(&self, _worker_id: usize, _item: &WorkItem) {}

    async fn report_fetch_completed(&self, _worker_id: usize, _item: &WorkItem, _bytes: usize) {}

    async fn report_lock_held(&self, _worker_id: usize, _item: &WorkItem, _hold: LockHold) {}

    async fn report_unit_finished(&self, _worker_id: usize, _item: &WorkItem, _finished: usize) {}

    async fn report_error(&self, _worker_id: usize, _item: &WorkItem, _error: &str) {}

    async fn report_completed(&self, _summary: &RunSummary) {}
}

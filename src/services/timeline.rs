// TimelineReporter - ユニット単位のイベント記録
//
// 各ワーカーがいつユニットに着手し、いつ集計器のロックを握り、いつ終えたかを
// 実行開始からの経過秒で記録する。記録はJSONとして書き出し、外部ツールで可視化する。

use crate::core::{
    LockHold, ProcessingError, ProcessingResult, ProgressReporter, RunSummary, WorkItem,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    RunStarted,
    UnitStarted,
    /// 本文の取得完了（集計前）
    FetchCompleted,
    LockAcquired,
    LockReleased,
    UnitFinished,
    UnitError,
    RunCompleted,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEvent {
    /// 実行開始からの経過秒
    pub time: f64,
    pub event: TimelineEventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 取得した本文のバイト数（`FetchCompleted` のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    /// 対応する `LockAcquired` と `LockReleased` で共通の番号
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold: Option<u64>,
}

impl TimelineEvent {
    fn new(time: f64, event: TimelineEventKind) -> Self {
        Self {
            time,
            event,
            worker: None,
            target: None,
            error: None,
            bytes: None,
            hold: None,
        }
    }

    fn on_unit(mut self, worker_id: usize, item: &WorkItem) -> Self {
        self.worker = Some(worker_id);
        self.target = Some(item.target());
        self
    }
}

#[derive(Serialize)]
struct TimelineDocument<'a> {
    started_at: &'a DateTime<Utc>,
    events: &'a [TimelineEvent],
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a RunSummary>,
}

#[derive(Debug, Default)]
struct TimelineState {
    /// 時刻順
    events: Vec<TimelineEvent>,
    next_hold: u64,
    summary: Option<RunSummary>,
}

/// イベントをメモリに溜める進捗報告実装
#[derive(Debug)]
pub struct TimelineReporter {
    start: Instant,
    started_at: DateTime<Utc>,
    state: Mutex<TimelineState>,
}

impl TimelineReporter {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            started_at: Utc::now(),
            state: Mutex::new(TimelineState::default()),
        }
    }

    fn seconds_since_start(&self, at: Instant) -> f64 {
        at.saturating_duration_since(self.start).as_secs_f64()
    }

    fn now(&self) -> f64 {
        self.seconds_since_start(Instant::now())
    }

    fn lock_state(&self) -> Option<MutexGuard<'_, TimelineState>> {
        match self.state.lock() {
            Ok(state) => Some(state),
            Err(_) => {
                warn!("timeline state poisoned, event dropped");
                None
            }
        }
    }

    /// ロック区間の報告は解放後に届くため、時刻順の位置へ挿入する
    fn insert(state: &mut TimelineState, record: TimelineEvent) {
        let index = state.events.partition_point(|e| e.time <= record.time);
        state.events.insert(index, record);
    }

    fn push(&self, record: TimelineEvent) {
        if let Some(mut state) = self.lock_state() {
            Self::insert(&mut state, record);
        }
    }

    /// 記録済みイベントのコピー
    pub fn events(&self) -> ProcessingResult<Vec<TimelineEvent>> {
        let state = self
            .state
            .lock()
            .map_err(|_| ProcessingError::lock_poisoned("TimelineReporter"))?;
        Ok(state.events.clone())
    }

    pub fn to_json(&self) -> ProcessingResult<String> {
        let state = self
            .state
            .lock()
            .map_err(|_| ProcessingError::lock_poisoned("TimelineReporter"))?;
        let document = TimelineDocument {
            started_at: &self.started_at,
            events: &state.events,
            summary: state.summary.as_ref(),
        };
        serde_json::to_string_pretty(&document)
            .map_err(|e| ProcessingError::internal(anyhow::Error::new(e)))
    }

    pub async fn write_json(&self, path: &Path) -> ProcessingResult<()> {
        let json = self.to_json()?;
        tokio::fs::write(path, json).await.map_err(|e| {
            ProcessingError::internal(
                anyhow::Error::new(e)
                    .context(format!("Failed to write timeline: {}", path.display())),
            )
        })
    }
}

impl Default for TimelineReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressReporter for TimelineReporter {
    async fn report_started(&self, _expected_units: Option<usize>) {
        self.push(TimelineEvent::new(self.now(), TimelineEventKind::RunStarted));
    }

    async fn report_unit_started(&self, worker_id: usize, item: &WorkItem) {
        self.push(
            TimelineEvent::new(self.now(), TimelineEventKind::UnitStarted).on_unit(worker_id, item),
        );
    }

    async fn report_fetch_completed(&self, worker_id: usize, item: &WorkItem, bytes: usize) {
        let mut record = TimelineEvent::new(self.now(), TimelineEventKind::FetchCompleted)
            .on_unit(worker_id, item);
        record.bytes = Some(bytes);
        self.push(record);
    }

    async fn report_lock_held(&self, worker_id: usize, item: &WorkItem, hold: LockHold) {
        let acquired = self.seconds_since_start(hold.acquired);
        let released = self.seconds_since_start(hold.released);
        let Some(mut state) = self.lock_state() else {
            return;
        };

        let id = state.next_hold;
        state.next_hold += 1;
        for (time, kind) in [
            (acquired, TimelineEventKind::LockAcquired),
            (released, TimelineEventKind::LockReleased),
        ] {
            let mut record = TimelineEvent::new(time, kind).on_unit(worker_id, item);
            record.hold = Some(id);
            Self::insert(&mut state, record);
        }
    }

    async fn report_unit_finished(&self, worker_id: usize, item: &WorkItem, _finished: usize) {
        self.push(
            TimelineEvent::new(self.now(), TimelineEventKind::UnitFinished).on_unit(worker_id, item),
        );
    }

    async fn report_error(&self, worker_id: usize, item: &WorkItem, error: &str) {
        let mut record =
            TimelineEvent::new(self.now(), TimelineEventKind::UnitError).on_unit(worker_id, item);
        record.error = Some(error.to_string());
        self.push(record);
    }

    async fn report_completed(&self, summary: &RunSummary) {
        let time = self.now();
        if let Some(mut state) = self.lock_state() {
            Self::insert(&mut state, TimelineEvent::new(time, TimelineEventKind::RunCompleted));
            state.summary = Some(summary.clone());
        }
    }
}

// Aggregator - 単一ロックで保護された共有集計状態
//
// 全ての変更はこのロックを通して直列化される。ロック内でI/Oは行わない。

pub mod frequency;
pub mod unsynchronized;

pub use frequency::{FrequencyTable, ALPHABET};
pub use unsynchronized::UnsynchronizedFrequencyTable;

use crate::core::{LockHold, ProcessingError, ProcessingResult};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

#[derive(Debug, Default)]
struct AggregateState {
    matches: Vec<PathBuf>,
    frequencies: FrequencyTable,
    lock_acquisitions: u64,
}

/// 1回の実行につき1つ作成し、`Arc` で各ワーカーに注入する集計器
#[derive(Debug, Default)]
pub struct Aggregator {
    state: Mutex<AggregateState>,
}

/// join後に読み出す集計結果（読み取り専用）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSnapshot {
    /// ロック取得順に並んだ一致パス
    pub matches: Vec<PathBuf>,
    pub frequencies: FrequencyTable,
    /// 変更操作のためにロックが取得された回数
    pub lock_acquisitions: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn acquire(&self) -> ProcessingResult<MutexGuard<'_, AggregateState>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ProcessingError::lock_poisoned("aggregator"))?;
        state.lock_acquisitions += 1;
        Ok(state)
    }

    /// ロックを1回取得して `mutate` を適用し、保持区間を返す
    fn with_lock<T>(
        &self,
        mutate: impl FnOnce(&mut AggregateState) -> T,
    ) -> ProcessingResult<(T, LockHold)> {
        let mut state = self.acquire()?;
        let acquired = Instant::now();
        let value = mutate(&mut *state);
        // 解放時刻はガードを落とす前に取る
        let released = Instant::now();
        drop(state);
        Ok((value, LockHold { acquired, released }))
    }

    /// MatchSetへ追記
    pub fn record_match(&self, path: impl Into<PathBuf>) -> ProcessingResult<()> {
        self.record_match_timed(path).map(|_| ())
    }

    /// `record_match` と同じだが、ロックの保持区間も返す
    pub fn record_match_timed(&self, path: impl Into<PathBuf>) -> ProcessingResult<LockHold> {
        let path = path.into();
        let ((), hold) = self.with_lock(|state| state.matches.push(path))?;
        Ok(hold)
    }

    /// テキスト中のアルファベットを1回のロック取得でまとめて加算
    ///
    /// 加算した文字数を返す。
    pub fn tally(&self, text: &[u8]) -> ProcessingResult<u64> {
        self.tally_timed(text).map(|(added, _)| added)
    }

    /// `tally` と同じだが、ロックの保持区間も返す
    pub fn tally_timed(&self, text: &[u8]) -> ProcessingResult<(u64, LockHold)> {
        let batch = FrequencyTable::from_text(text);
        let added = batch.total();
        let ((), hold) = self.with_lock(|state| state.frequencies.merge(&batch))?;
        Ok((added, hold))
    }

    /// 現在の状態のコピーを取得
    pub fn snapshot(&self) -> ProcessingResult<AggregateSnapshot> {
        let state = self
            .state
            .lock()
            .map_err(|_| ProcessingError::lock_poisoned("aggregator"))?;
        Ok(AggregateSnapshot {
            matches: state.matches.clone(),
            frequencies: state.frequencies.clone(),
            lock_acquisitions: state.lock_acquisitions,
        })
    }

    /// 集計器を消費してスナップショットに変換
    pub fn into_snapshot(self) -> ProcessingResult<AggregateSnapshot> {
        let state = self
            .state
            .into_inner()
            .map_err(|_| ProcessingError::lock_poisoned("aggregator"))?;
        Ok(AggregateSnapshot {
            matches: state.matches,
            frequencies: state.frequencies,
            lock_acquisitions: state.lock_acquisitions,
        })
    }
}

// UnsynchronizedFrequencyTable - 意図的に壊れた集計表
//
// 読み取り → 待機 → 書き込みをロックの外で行うため、並行に使うと更新が失われる。
// `Aggregator` のロック規律が必要であることを示す比較対象としてのみ使う。

use super::frequency::FrequencyTable;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

/// 更新消失を起こす集計表
pub struct UnsynchronizedFrequencyTable {
    cells: [AtomicU64; 26],
    min_window_micros: u64,
    max_window_micros: u64,
}

impl Default for UnsynchronizedFrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl UnsynchronizedFrequencyTable {
    /// 10〜100マイクロ秒の競合窓で作成
    pub fn new() -> Self {
        Self::with_race_window(Duration::from_micros(10), Duration::from_micros(100))
    }

    pub fn with_race_window(min: Duration, max: Duration) -> Self {
        let min_window_micros = min.as_micros() as u64;
        Self {
            cells: std::array::from_fn(|_| AtomicU64::new(0)),
            min_window_micros,
            max_window_micros: (max.as_micros() as u64).max(min_window_micros),
        }
    }

    /// 1文字ずつ読み取り・待機・書き込みを行う（同期なし）
    pub fn tally_racy(&self, text: &[u8]) {
        for &byte in text {
            let Some(slot) = FrequencyTable::slot(byte) else {
                continue;
            };
            let observed = self.cells[slot].load(Ordering::Relaxed);
            let window = fastrand::u64(self.min_window_micros..=self.max_window_micros);
            thread::sleep(Duration::from_micros(window));
            self.cells[slot].store(observed + 1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> FrequencyTable {
        FrequencyTable::from_counts(std::array::from_fn(|slot| {
            self.cells[slot].load(Ordering::Relaxed)
        }))
    }
}

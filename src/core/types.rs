// 集計エンジンで共有するデータ型定義

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// ワーカープールに投入される作業ユニット
///
/// 一度作成されたら変更されない。デキューしたワーカーが処理完了まで所有する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WorkItem {
    /// 1ディレクトリ分の列挙
    DirectoryScan(PathBuf),
    /// 1URL分の取得と文字数集計
    FetchAndCount(String),
}

impl WorkItem {
    pub fn directory_scan(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryScan(path.into())
    }

    pub fn fetch_and_count(url: impl Into<String>) -> Self {
        Self::FetchAndCount(url.into())
    }

    /// 種別名（ログ・タイムライン用）
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DirectoryScan(_) => "directory_scan",
            Self::FetchAndCount(_) => "fetch_and_count",
        }
    }

    /// 対象リソース（パスまたはURL）の文字列表現
    pub fn target(&self) -> String {
        match self {
            Self::DirectoryScan(path) => path.display().to_string(),
            Self::FetchAndCount(url) => url.clone(),
        }
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.target())
    }
}

/// 1ユニットの処理結果（エラー以外）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    Completed,
    /// キャンセルトークンにより途中で打ち切られた
    Cancelled,
}

/// 集計器のロックを保持していた区間
///
/// どちらの時刻もロック保持中に記録するため、別の呼び出しの区間と重ならない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockHold {
    pub acquired: Instant,
    pub released: Instant,
}

impl LockHold {
    pub fn duration(&self) -> Duration {
        self.released.saturating_duration_since(self.acquired)
    }
}

/// 実行全体のサマリー
///
/// 集計結果がどこまで完全かは `failed_units` と `cancelled_units` から判断できる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// 事前に分かっている総ユニット数（取得ジェネレータのみ）
    pub expected_units: Option<usize>,
    pub submitted_units: usize,
    pub succeeded_units: usize,
    pub failed_units: usize,
    pub cancelled_units: usize,
    pub worker_count: usize,
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn finished_units(&self) -> usize {
        self.succeeded_units + self.failed_units + self.cancelled_units
    }

    /// 全ユニットが成功したかどうか
    pub fn is_complete(&self) -> bool {
        self.failed_units == 0 && self.cancelled_units == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_item_display() {
        let scan = WorkItem::directory_scan("/tmp/data");
        assert_eq!(scan.kind(), "directory_scan");
        assert_eq!(scan.to_string(), "directory_scan(/tmp/data)");

        let fetch = WorkItem::fetch_and_count("https://example.com/a.txt");
        assert_eq!(fetch.kind(), "fetch_and_count");
        assert_eq!(fetch.target(), "https://example.com/a.txt");
    }

    #[test]
    fn test_run_summary_completeness() {
        let mut summary = RunSummary {
            expected_units: Some(20),
            submitted_units: 20,
            succeeded_units: 20,
            failed_units: 0,
            cancelled_units: 0,
            worker_count: 4,
            elapsed_ms: 120,
        };
        assert!(summary.is_complete());
        assert_eq!(summary.finished_units(), 20);

        summary.succeeded_units = 18;
        summary.failed_units = 2;
        assert!(!summary.is_complete());
        assert_eq!(summary.finished_units(), 20);
    }

    #[test]
    fn test_lock_hold_duration() {
        let acquired = Instant::now();
        let hold = LockHold {
            acquired,
            released: acquired + Duration::from_millis(5),
        };
        assert_eq!(hold.duration(), Duration::from_millis(5));
    }

    #[test]
    fn test_run_summary_serializes() {
        let summary = RunSummary {
            expected_units: None,
            submitted_units: 3,
            succeeded_units: 2,
            failed_units: 1,
            cancelled_units: 0,
            worker_count: 2,
            elapsed_ms: 5,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["expected_units"], serde_json::Value::Null);
        assert_eq!(json["failed_units"], 1);
    }
}

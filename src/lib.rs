//! concurrent_tally - 共有ワーカープールによる並列集計エンジン
//!
//! 2種類の作業（ディレクトリ木の再帰走査、URL本文の文字頻度集計）を
//! 同じディスパッチャ・完了バリア・単一ロックの集計器に載せて実行する。
//!
//! ```no_run
//! use concurrent_tally::engine::create_quiet_search_engine;
//! use std::path::Path;
//!
//! # async fn run() -> concurrent_tally::core::ProcessingResult<()> {
//! let engine = create_quiet_search_engine();
//! let report = engine.search(Path::new("/srv/repos"), "README.md").await?;
//! println!("{} matches", report.matches.len());
//! # Ok(())
//! # }
//! ```

// コアレイヤー
pub mod core;

// 集計器（単一ロック）
pub mod aggregator;

// 外部協調者
pub mod fetch;
pub mod storage;

// サービス層
pub mod services;

// 作業ジェネレータ
pub mod generators;

// エンジン層
pub mod engine;

// アプリケーション層
pub mod cli;
pub mod file_scanner;
pub mod logging;

pub use crate::aggregator::{AggregateSnapshot, Aggregator, FrequencyTable, UnsynchronizedFrequencyTable};
pub use crate::core::{
    LockHold, PoolConfig, ProcessingError, ProcessingResult, ProgressReporter, RunSummary, WorkItem,
};
pub use crate::engine::{LetterCountEngine, LetterReport, SearchEngine, SearchReport, WorkerPool};

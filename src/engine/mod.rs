// エンジン層 - 並列実行とオーケストレーション
// ディスパッチャ・ワーカープール・完了バリアを組み合わせて1回の実行を提供

pub mod api;
pub mod dispatcher;
mod pipeline;
pub mod pool;
pub mod processing_engine;
pub mod worker;

// 公開API - 主要エンジンクラス
pub use api::{
    count_with_engine, create_default_search_engine, create_http_letter_engine,
    create_quiet_search_engine, search_with_engine,
};
pub use dispatcher::{UnitStats, WorkSpawner};
pub use pipeline::RunPipeline;
pub use pool::WorkerPool;
pub use processing_engine::{LetterCountEngine, LetterReport, SearchEngine, SearchReport};
pub use worker::{UnitContext, WorkProcessor};

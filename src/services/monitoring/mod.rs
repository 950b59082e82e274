// 進捗監視機能
// 実行開始、ユニット単位の着手・完了、エラー、完了通知

pub mod implementations;

// 公開API
pub use implementations::{ConsoleProgressReporter, NoOpProgressReporter};

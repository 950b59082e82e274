// サービス層 - 設定と進捗報告の具象実装
// エンジンはトレイト経由でのみこれらを参照する

pub mod config;
pub mod monitoring;
pub mod timeline;

// 公開API - 各サービスの主要機能を明示的にエクスポート
pub use config::{ConfigPreset, DefaultPoolConfig};
pub use monitoring::{ConsoleProgressReporter, NoOpProgressReporter};
pub use timeline::{TimelineEvent, TimelineEventKind, TimelineReporter};

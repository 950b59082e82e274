// 設定管理
// ワーカー数・取得タイムアウト・進捗報告の有無

pub mod implementations;

pub use implementations::{ConfigPreset, DefaultPoolConfig};

pub mod letters;
pub mod search;

pub use letters::*;
pub use search::*;

use crate::core::ProcessingError;
use crate::services::DefaultPoolConfig;
use anyhow::Result;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// プリセットとコマンドライン指定から実行設定を組み立てる
pub fn build_pool_config(
    config_preset: Option<&str>,
    workers: Option<usize>,
    timeout_secs: Option<u64>,
) -> Result<DefaultPoolConfig> {
    let mut config = match config_preset {
        Some(name) => DefaultPoolConfig::from_preset_name(name)?,
        None => DefaultPoolConfig::default(),
    };
    if let Some(workers) = workers {
        config = config.with_worker_count(workers);
    }
    if let Some(secs) = timeout_secs {
        config = config.with_fetch_timeout(Duration::from_secs(secs));
    }
    config.validate()?;
    Ok(config)
}

/// Ctrl-C で実行中のユニットにキャンセルを伝えるトークン
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling remaining units");
            token.cancel();
        }
    });
    cancel
}

/// 失敗時に標準エラーへ出す行
///
/// 原因に `ProcessingError` が含まれていれば、重要度と対処方法も添える。
pub fn describe_failure(error: &anyhow::Error) -> Vec<String> {
    let mut lines = vec![format!("❌ エラー: {error:#}")];
    let Some(cause) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ProcessingError>())
    else {
        return lines;
    };

    let severity = cause.severity();
    lines.push(format!(
        "   - 重要度: {} (レベル {})",
        severity.as_str(),
        severity.as_level()
    ));
    let context = cause.context();
    if context.operation != "unknown" {
        lines.push(format!("   - 操作: {}", context.operation));
    }
    if let Some(resource) = context.resource {
        lines.push(format!("   - 対象: {resource}"));
    }
    if let Some(suggestion) = context.suggestion {
        lines.push(format!("💡 {suggestion}"));
    }
    lines
}

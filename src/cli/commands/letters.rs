use super::{build_pool_config, cancel_on_ctrl_c};
use crate::core::{PoolConfig, ProgressReporter};
use crate::engine::{create_http_letter_engine, LetterReport};
use crate::fetch::default_rfc_urls;
use crate::services::{ConsoleProgressReporter, DefaultPoolConfig, TimelineReporter};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// lettersコマンドの設定
pub struct LettersCommandConfig {
    pub urls: Vec<String>,
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub config_preset: Option<String>,
    pub timeline: Option<PathBuf>,
    pub quiet: bool,
}

pub async fn execute_letters(config: LettersCommandConfig) -> Result<()> {
    let pool_config = build_pool_config(
        config.config_preset.as_deref(),
        config.workers,
        config.timeout_secs,
    )?;
    let urls = if config.urls.is_empty() {
        default_rfc_urls()
    } else {
        config.urls.clone()
    };

    if !config.quiet {
        println!("🔤 文字頻度集計開始");
        println!("   - URL数: {}", urls.len());
        println!("   - ワーカー数: {}", pool_config.worker_count());
        println!(
            "   - タイムアウト: {}秒",
            pool_config.fetch_timeout().as_secs()
        );
    }

    let report = match &config.timeline {
        Some(path) => {
            let timeline = Arc::new(TimelineReporter::new());
            // タイムラインはプリセットに関わらずイベントを受け取る
            let pool_config = pool_config.with_progress_reporting(true);
            let report = run_count(urls, pool_config, Arc::clone(&timeline)).await?;
            timeline.write_json(path).await?;
            if !config.quiet {
                println!("📄 タイムラインを {} に保存しました", path.display());
            }
            report
        }
        None => {
            let reporter = if config.quiet {
                ConsoleProgressReporter::quiet()
            } else {
                ConsoleProgressReporter::new()
            };
            run_count(urls, pool_config, reporter).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&report.frequencies)?);
    println!(
        "Done, time taken {:.3}s",
        report.summary.elapsed_ms as f64 / 1000.0
    );
    if !config.quiet {
        println!("   - 成功: {}", report.summary.succeeded_units);
        println!("   - 失敗: {}", report.summary.failed_units);
        println!("   - キャンセル: {}", report.summary.cancelled_units);
        println!("   - ロック取得回数: {}", report.lock_acquisitions);
    }
    if report.summary.failed_units > 0 {
        println!(
            "⚠️  {}個のURLで取得に失敗しました（集計には含まれていません）",
            report.summary.failed_units
        );
    }

    Ok(())
}

async fn run_count<R>(
    urls: Vec<String>,
    pool_config: DefaultPoolConfig,
    reporter: R,
) -> Result<LetterReport>
where
    R: ProgressReporter + 'static,
{
    let engine = create_http_letter_engine(pool_config, reporter)?
        .with_cancellation(cancel_on_ctrl_c());
    Ok(engine.count(urls).await?)
}

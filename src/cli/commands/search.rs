use super::{build_pool_config, cancel_on_ctrl_c};
use crate::core::{PoolConfig, ProgressReporter};
use crate::engine::{SearchEngine, SearchReport};
use crate::file_scanner::SequentialScanner;
use crate::services::{ConsoleProgressReporter, DefaultPoolConfig};
use crate::storage::LocalDirectoryLister;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

/// searchコマンドの設定
pub struct SearchCommandConfig {
    pub root: PathBuf,
    pub pattern: String,
    pub workers: Option<usize>,
    pub config_preset: Option<String>,
    pub json: bool,
    pub sequential_check: bool,
    pub quiet: bool,
}

pub async fn execute_search(config: SearchCommandConfig) -> Result<()> {
    let pool_config = build_pool_config(config.config_preset.as_deref(), config.workers, None)?;
    let silent = config.quiet || config.json;

    if !silent {
        println!("🔍 ディレクトリ検索開始");
        println!("   - ルート: {}", config.root.display());
        println!("   - パターン: {}", config.pattern);
        println!("   - ワーカー数: {}", pool_config.worker_count());
    }

    let reporter = if silent {
        ConsoleProgressReporter::quiet()
    } else {
        ConsoleProgressReporter::new()
    };
    let report = run_search(&config, pool_config, reporter).await?;
    let sequential_matches = if config.sequential_check {
        Some(verify_against_sequential(&report).await?)
    } else {
        None
    };

    if config.json {
        println!("{}", render_json(&report, sequential_matches)?);
        return Ok(());
    }

    for path in &report.matches {
        println!("{}", path.display());
    }
    if !config.quiet {
        println!("✅ 検索完了!");
        println!("   - 一致数: {}", report.matches.len());
        println!("   - 走査ディレクトリ: {}", report.summary.submitted_units);
        println!("   - 失敗ディレクトリ: {}", report.summary.failed_units);
        println!("   - ロック取得回数: {}", report.lock_acquisitions);
        println!("   - 処理時間: {}ms", report.summary.elapsed_ms);
        if let Some(count) = sequential_matches {
            println!("🧮 逐次検索と一致: {count} 件");
        }
    }

    Ok(())
}

/// `--json` の出力。逐次検証を行った場合はその一致数も同じ文書に含める
#[derive(Serialize)]
struct SearchOutput<'a> {
    #[serde(flatten)]
    report: &'a SearchReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    sequential_matches: Option<usize>,
}

fn render_json(report: &SearchReport, sequential_matches: Option<usize>) -> Result<String> {
    let output = SearchOutput {
        report,
        sequential_matches,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

async fn run_search<R>(
    config: &SearchCommandConfig,
    pool_config: DefaultPoolConfig,
    reporter: R,
) -> Result<SearchReport>
where
    R: ProgressReporter + 'static,
{
    let engine = SearchEngine::new(LocalDirectoryLister::new(), pool_config, reporter)
        .with_cancellation(cancel_on_ctrl_c());
    let report = engine
        .search(&config.root, &config.pattern)
        .await
        .with_context(|| format!("Search failed: {}", config.root.display()))?;
    Ok(report)
}

/// 逐次版と一致集合を比較し、食い違えばエラーにする
///
/// 一致した場合は逐次版の一致数を返す。
async fn verify_against_sequential(report: &SearchReport) -> Result<usize> {
    let root = report.root.clone();
    let pattern = report.pattern.clone();
    let expected =
        tokio::task::spawn_blocking(move || SequentialScanner::find_matches(&root, &pattern))
            .await??;

    let mut actual = report.matches.clone();
    actual.sort();

    if actual != expected {
        anyhow::bail!(
            "Sequential check failed: concurrent search found {} matches, sequential found {}",
            actual.len(),
            expected.len()
        );
    }
    Ok(expected.len())
}

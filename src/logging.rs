// ログ初期化
// RUST_LOG が設定されていればそれを優先する

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// `-v` の回数と `-q` から既定のフィルタを決める
pub fn default_filter(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "concurrent_tally=error";
    }
    match verbosity {
        0 => "concurrent_tally=warn",
        1 => "concurrent_tally=info,warn",
        2 => "concurrent_tally=debug,warn",
        _ => "concurrent_tally=trace,info",
    }
}

pub fn init_logging(verbosity: u8, quiet: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(verbosity >= 2)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(())
}

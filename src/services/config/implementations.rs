// 設定管理の具象実装

use crate::core::{PoolConfig, ProcessingError, ProcessingResult};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const MIN_DEFAULT_WORKERS: usize = 4;

/// 名前付きの設定プリセット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    Default,
    HighConcurrency,
    Testing,
}

impl ConfigPreset {
    pub fn available() -> &'static [&'static str] {
        &["default", "high_concurrency", "testing"]
    }
}

impl FromStr for ConfigPreset {
    type Err = ProcessingError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "default" => Ok(Self::Default),
            "high_concurrency" => Ok(Self::HighConcurrency),
            "testing" => Ok(Self::Testing),
            other => Err(ProcessingError::configuration(format!(
                "未サポートのプリセット: {}. 利用可能: {}",
                other,
                Self::available().join(", ")
            ))),
        }
    }
}

/// デフォルト設定実装
#[derive(Debug, Clone)]
pub struct DefaultPoolConfig {
    worker_count: usize,
    fetch_timeout: Duration,
    enable_progress: bool,
}

impl DefaultPoolConfig {
    /// ワーカー数を指定して作成（値はそのまま使う。検証は `validate` で行う）
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            enable_progress: true,
        }
    }

    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            // 取得系ユニットはI/O待ちが主体なのでCPU数を大きく超えてよい
            ConfigPreset::HighConcurrency => Self::new(100).with_fetch_timeout(Duration::from_secs(60)),
            ConfigPreset::Testing => Self::new(2)
                .with_fetch_timeout(Duration::from_secs(5))
                .with_progress_reporting(false),
        }
    }

    /// プリセット名から作成
    pub fn from_preset_name(name: &str) -> ProcessingResult<Self> {
        Ok(Self::from_preset(name.parse()?))
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn with_progress_reporting(mut self, enable: bool) -> Self {
        self.enable_progress = enable;
        self
    }

    /// 設定値の整合性を検証
    pub fn validate(&self) -> ProcessingResult<()> {
        if self.worker_count == 0 {
            return Err(ProcessingError::configuration(
                "ワーカー数は1以上である必要があります",
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ProcessingError::configuration(
                "取得タイムアウトは0より大きい必要があります",
            ));
        }
        Ok(())
    }
}

impl Default for DefaultPoolConfig {
    fn default() -> Self {
        Self::new(num_cpus::get().max(MIN_DEFAULT_WORKERS))
    }
}

impl PoolConfig for DefaultPoolConfig {
    fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    fn enable_progress_reporting(&self) -> bool {
        self.enable_progress
    }
}

// 集計エンジン用のカスタムエラー型定義
// ユニット単位で回復可能なエラーと、プログラミングミスを示す致命的エラーを区別する

use thiserror::Error;

/// 集計エンジン固有のエラー型
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("ディレクトリ列挙エラー: {path} - {source}")]
    DirectoryListingError {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("取得エラー: {url} - {source}")]
    FetchError {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("ディスパッチャ停止済み: {message}")]
    DispatcherClosed { message: String },

    #[error("設定エラー: {message}")]
    ConfigurationError { message: String },

    #[error("ルートパスエラー: {path} - {reason}")]
    InvalidRoot { path: String, reason: String },

    #[error("ロック汚染エラー: {component}")]
    LockPoisoned { component: String },

    #[error("未対応の作業ユニット: {item} (処理系: {processor})")]
    UnsupportedItem { item: String, processor: String },

    #[error("ユニットパニック: {message}")]
    UnitPanicked { message: String },

    #[error("タスクエラー: {source}")]
    TaskError {
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("内部エラー: {source}")]
    InternalError {
        #[source]
        source: anyhow::Error,
    },
}

impl ProcessingError {
    /// ディレクトリ列挙エラーの作成
    pub fn directory_listing(path: impl Into<String>, source: anyhow::Error) -> Self {
        Self::DirectoryListingError {
            path: path.into(),
            source,
        }
    }

    /// 取得エラーの作成
    pub fn fetch(url: impl Into<String>, source: anyhow::Error) -> Self {
        Self::FetchError {
            url: url.into(),
            source,
        }
    }

    pub fn dispatcher_closed(message: impl Into<String>) -> Self {
        Self::DispatcherClosed {
            message: message.into(),
        }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    pub fn invalid_root(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// ロック汚染エラーの作成
    pub fn lock_poisoned(component: impl Into<String>) -> Self {
        Self::LockPoisoned {
            component: component.into(),
        }
    }

    pub fn unsupported_item(item: impl Into<String>, processor: impl Into<String>) -> Self {
        Self::UnsupportedItem {
            item: item.into(),
            processor: processor.into(),
        }
    }

    pub fn unit_panicked(message: impl Into<String>) -> Self {
        Self::UnitPanicked {
            message: message.into(),
        }
    }

    /// タスクエラーの作成
    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::TaskError { source }
    }

    /// 内部エラーの作成
    pub fn internal(source: anyhow::Error) -> Self {
        Self::InternalError { source }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DirectoryListingError { .. } => ErrorSeverity::Low,
            Self::FetchError { .. } | Self::DispatcherClosed { .. } => ErrorSeverity::Medium,
            Self::ConfigurationError { .. } | Self::InvalidRoot { .. } => ErrorSeverity::High,
            Self::TaskError { .. } => ErrorSeverity::High,
            Self::LockPoisoned { .. }
            | Self::UnsupportedItem { .. }
            | Self::UnitPanicked { .. }
            | Self::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// ユニット内で握りつぶしてよいエラーかどうか
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::DirectoryListingError { .. } => true,
            Self::FetchError { .. } => true,
            Self::DispatcherClosed { .. } => true,
            Self::ConfigurationError { .. } | Self::InvalidRoot { .. } => false,
            Self::LockPoisoned { .. } => false,
            Self::UnsupportedItem { .. } => false,
            Self::UnitPanicked { .. } => false,
            Self::TaskError { .. } => false,
            Self::InternalError { .. } => false,
        }
    }

    /// エラーコンテキストを取得
    pub fn context(&self) -> ErrorContext {
        match self {
            Self::DirectoryListingError { path, .. } => ErrorContext::new("directory_listing")
                .with_resource(path.clone())
                .with_suggestion("ディレクトリのアクセス権限を確認してください"),
            Self::FetchError { url, .. } => ErrorContext::new("fetch")
                .with_resource(url.clone())
                .with_suggestion("URLとネットワーク接続を確認してください"),
            Self::InvalidRoot { path, .. } => ErrorContext::new("root_validation")
                .with_resource(path.clone())
                .with_suggestion("存在するディレクトリを指定してください"),
            Self::ConfigurationError { message } => ErrorContext::new("configuration")
                .with_suggestion(format!("設定を確認してください: {message}")),
            Self::LockPoisoned { component } => {
                ErrorContext::new("lock_acquisition").with_resource(component.clone())
            }
            _ => ErrorContext::new("unknown"),
        }
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - デバッグログ程度
    Low,
    /// 中重要度 - 警告レベル
    Medium,
    /// 高重要度 - 実行開始前に拒否
    High,
    /// 致命的 - プログラミングミス
    Critical,
}

impl ErrorSeverity {
    pub const fn as_level(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// エラーコンテキスト情報
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// 実行していた操作
    pub operation: String,
    /// 関連するリソース（パスやURL）
    pub resource: Option<String>,
    /// エラー解決のための提案
    pub suggestion: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            resource: None,
            suggestion: None,
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// 集計処理の結果型
pub type ProcessingResult<T> = std::result::Result<T, ProcessingError>;

impl From<anyhow::Error> for ProcessingError {
    fn from(error: anyhow::Error) -> Self {
        ProcessingError::InternalError { source: error }
    }
}

impl From<tokio::task::JoinError> for ProcessingError {
    fn from(error: tokio::task::JoinError) -> Self {
        ProcessingError::TaskError { source: error }
    }
}

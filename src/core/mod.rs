// コアレイヤー - 基盤となるトレイト、型、エラー定義
// 他のレイヤーから参照される基本的な抽象化を提供

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ErrorContext, ErrorSeverity, ProcessingError, ProcessingResult};
pub use traits::{PoolConfig, ProgressReporter};
#[cfg(test)]
pub use traits::{MockPoolConfig, MockProgressReporter};
pub use types::{LockHold, RunSummary, UnitOutcome, WorkItem};

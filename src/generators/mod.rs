// 作業ジェネレータ - 同じエンジンに載る2種類のユニット処理系

pub mod directory;
pub mod fetch;

pub use directory::DirectorySearch;
pub use fetch::LetterCounter;

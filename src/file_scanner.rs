use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// 単一スレッドで木全体を辿る逐次版の検索
///
/// 並列検索と同じ規則（名前の部分一致、シンボリックリンクは辿らない、
/// 読めないディレクトリはスキップ）で期待値を求める。
pub struct SequentialScanner;

impl SequentialScanner {
    pub fn find_matches(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let mut matches = Vec::new();

        // min_depth(1): ルート自身は列挙対象ではない
        for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            if entry.file_name().to_string_lossy().contains(pattern) {
                matches.push(entry.path().to_path_buf());
            }
        }

        matches.sort();
        Ok(matches)
    }
}

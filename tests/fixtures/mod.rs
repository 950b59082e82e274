// テストユーティリティ
// 一時ディレクトリ木と固定本文コーパスの生成

#![allow(dead_code)]

use concurrent_tally::fetch::StaticFetcher;
use concurrent_tally::services::DefaultPoolConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PATTERN: &str = "README.md";

/// 進捗出力なしの設定
pub fn quiet_config(workers: usize) -> DefaultPoolConfig {
    DefaultPoolConfig::new(workers).with_progress_reporting(false)
}

/// 幅 `fanout`・深さ `depth` のディレクトリ木を作り、各ディレクトリに
/// `README.md` と無関係なファイルを1つずつ置く
///
/// 戻り値は作成した `README.md` のパス（ソート済み）。
pub fn build_tree(root: &Path, depth: usize, fanout: usize) -> Vec<PathBuf> {
    let mut expected = Vec::new();
    populate(root, depth, fanout, &mut expected);
    expected.sort();
    expected
}

fn populate(dir: &Path, depth: usize, fanout: usize, expected: &mut Vec<PathBuf>) {
    let readme = dir.join(PATTERN);
    fs::write(&readme, b"# readme").unwrap();
    expected.push(readme);
    fs::write(dir.join("notes.txt"), b"not a match").unwrap();

    if depth == 0 {
        return;
    }
    for index in 0..fanout {
        let child = dir.join(format!("dir_{depth}_{index}"));
        fs::create_dir(&child).unwrap();
        populate(&child, depth - 1, fanout, expected);
    }
}

pub fn temp_tree(depth: usize, fanout: usize) -> (TempDir, Vec<PathBuf>) {
    let temp_dir = TempDir::new().unwrap();
    let expected = build_tree(temp_dir.path(), depth, fanout);
    (temp_dir, expected)
}

/// 決まった内容の本文を `count` 件持つ取得器と、そのURL一覧・期待文字数
pub fn fixed_corpus(count: usize) -> (StaticFetcher, Vec<String>, u64) {
    let mut fetcher = StaticFetcher::new();
    let mut urls = Vec::with_capacity(count);
    let mut expected_total = 0u64;

    for index in 0..count {
        let url = format!("mem://rfc/{index}");
        let body = format!(
            "RFC {index}: The Quick Brown Fox jumps over the lazy dog #{index}\n{}",
            "Zz-Yy ".repeat(index % 7)
        );
        expected_total += body.bytes().filter(u8::is_ascii_alphabetic).count() as u64;
        fetcher = fetcher.with_body(url.clone(), body);
        urls.push(url);
    }

    (fetcher, urls, expected_total)
}

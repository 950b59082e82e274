// FrequencyTable - 26文字固定アルファベットの出現回数表

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// 集計対象のアルファベット（キーは常にこの26文字）
pub const ALPHABET: [u8; 26] = *b"abcdefghijklmnopqrstuvwxyz";

/// 文字ごとの出現回数
///
/// 全キーが0で初期化され、キーの追加・削除は起こらない。値の更新のみ。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 26],
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// テキストをロック外で数えた局所バッチを作成
    pub fn from_text(text: &[u8]) -> Self {
        let mut table = Self::new();
        for &byte in text {
            if let Some(slot) = Self::slot(byte) {
                table.counts[slot] += 1;
            }
        }
        table
    }

    pub(crate) fn from_counts(counts: [u64; 26]) -> Self {
        Self { counts }
    }

    /// 小文字化したバイトがアルファベットならそのスロット番号
    pub(crate) fn slot(byte: u8) -> Option<usize> {
        let lower = byte.to_ascii_lowercase();
        lower
            .is_ascii_lowercase()
            .then(|| usize::from(lower - b'a'))
    }

    /// キー以外の文字には `None` を返す
    pub fn get(&self, letter: char) -> Option<u64> {
        if letter.is_ascii_lowercase() {
            Some(self.counts[letter as usize - 'a' as usize])
        } else {
            None
        }
    }

    /// 全キーの合計
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// 別の表の値を加算
    pub fn merge(&mut self, other: &FrequencyTable) {
        for (count, added) in self.counts.iter_mut().zip(other.counts.iter()) {
            *count += added;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        ALPHABET
            .iter()
            .zip(self.counts.iter())
            .map(|(&letter, &count)| (char::from(letter), count))
    }

    pub fn to_map(&self) -> BTreeMap<char, u64> {
        self.iter().collect()
    }

    /// 出現回数の多い順（同数はアルファベット順）
    pub fn sorted_by_count(&self) -> Vec<(char, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ALPHABET.len()))?;
        for (letter, count) in self.iter() {
            map.serialize_entry(&letter.to_string(), &count)?;
        }
        map.end()
    }
}

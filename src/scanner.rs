//! Row Scanner Module
//!
//! 取引表の論理的な終端（集計ブロックの開始行）を検出し、
//! それ以降の行を切り捨てる処理を提供するモジュール。
//!
//! POSエクスポートは取引表の後ろに集計ブロックを連結しており、構造的な区切りは
//! 「Total Amount for」というフレーズのみです。最初にこのフレーズを含む行を
//! マーカー行とし、その行を含めて以降をすべて破棄します。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::DEFAULT_MARKER_PHRASE;
use crate::error::CashIifError;
use crate::types::{CellValue, RawTable};

static DEFAULT_SCANNER: Lazy<RowScanner> = Lazy::new(|| RowScanner {
    pattern: build_pattern(DEFAULT_MARKER_PHRASE).expect("default marker phrase compiles"),
});

/// マーカーフレーズから正規表現を構築する
///
/// - 大文字小文字を区別しない
/// - 単語間の空白は1文字以上の任意の空白にマッチする
/// - 両端が単語文字の場合、ASCIIの単語境界（`[0-9A-Za-z_]`）で区切られる
fn build_pattern(phrase: &str) -> Result<Regex, CashIifError> {
    let phrase = phrase.trim();
    let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return Err(CashIifError::Config("Marker phrase must not be empty".to_string()));
    }

    let is_word = |c: Option<char>| c.map_or(false, |c| c.is_ascii_alphanumeric() || c == '_');
    let head = if is_word(phrase.chars().next()) { r"(?-u:\b)" } else { "" };
    let tail = if is_word(phrase.chars().last()) { r"(?-u:\b)" } else { "" };

    let pattern = format!(r"(?i){}{}{}", head, words.join(r"\s+"), tail);
    Regex::new(&pattern)
        .map_err(|e| CashIifError::Config(format!("Invalid marker phrase: {}", e)))
}

/// マーカー行スキャナー
#[derive(Debug, Clone)]
pub struct RowScanner {
    pattern: Regex,
}

impl Default for RowScanner {
    fn default() -> Self {
        DEFAULT_SCANNER.clone()
    }
}

impl RowScanner {
    /// 任意のマーカーフレーズでスキャナーを生成する
    ///
    /// # 戻り値
    ///
    /// * `Err(CashIifError::Config)` - フレーズが空、または空白のみの場合
    pub fn new(phrase: &str) -> Result<Self, CashIifError> {
        Ok(Self {
            pattern: build_pattern(phrase)?,
        })
    }

    /// 行内のいずれかのセルがマーカーフレーズを含むかどうか
    ///
    /// 数値・日時・空セルはフレーズを含み得ないため、文字列セルのみを検査します。
    pub fn row_matches(&self, row: &[CellValue]) -> bool {
        row.iter().any(|cell| match cell {
            CellValue::Text(s) => self.pattern.is_match(s),
            CellValue::Number(_) | CellValue::DateTime(_) | CellValue::Empty => false,
        })
    }

    /// 最初のマーカー行のインデックスを返す
    pub fn find_marker_row(&self, table: &RawTable) -> Option<usize> {
        table.rows().iter().position(|row| self.row_matches(row))
    }

    /// マーカー行より前の行だけを残したテーブルを返す
    ///
    /// マーカー行が見つからない場合は、入力をそのまま返します。
    pub fn truncate(&self, table: &RawTable) -> RawTable {
        match self.find_marker_row(table) {
            Some(index) => {
                log::debug!(
                    "Marker row found at index {}; keeping {} of {} rows",
                    index,
                    index,
                    table.len()
                );
                table.prefix(index)
            }
            None => {
                log::debug!("No marker row found; keeping all {} rows", table.len());
                table.clone()
            }
        }
    }
}

/// 既定のフレーズ（`Total Amount for`）で最初のマーカー行を探す
pub fn find_marker_row(table: &RawTable) -> Option<usize> {
    DEFAULT_SCANNER.find_marker_row(table)
}

/// 既定のフレーズ（`Total Amount for`）でテーブルを切り詰める
pub fn truncate_at_marker(table: &RawTable) -> RawTable {
    DEFAULT_SCANNER.truncate(table)
}

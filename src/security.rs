//! Security Module
//!
//! 入力ファイルに対する資源制限を提供するモジュール。
//! ワークブック全体をメモリに読み込むため、入力サイズと読み込む行数に上限を設けます。

use crate::error::CashIifError;

/// セキュリティ設定
///
/// ファイル処理時の資源制限を定義します。
///
/// ZIPの展開後サイズは検査しません。行数はシートが宣言する寸法で事前に検証しますが、
/// 寸法の宣言がない（または実際より小さい）シートでは、calamineが範囲全体を
/// 展開した後にしか検出できないため、展開中のメモリ使用量は制限されません。
/// 信頼できない入力では`max_input_file_size`を小さく設定してください。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 256MB (268_435_456 bytes)
    pub max_input_file_size: u64,

    /// シートから読み込む最大行数
    /// デフォルト: 1,048,576（Excelの最大行数）
    pub max_rows: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 268_435_456, // 256MB
            max_rows: 1_048_576,
        }
    }
}

impl SecurityConfig {
    /// 入力サイズを検証
    pub(crate) fn check_input_size(&self, bytes: u64) -> Result<(), CashIifError> {
        if bytes > self.max_input_file_size {
            return Err(CashIifError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes, self.max_input_file_size
            )));
        }
        Ok(())
    }

    /// 行数を検証
    pub(crate) fn check_row_count(&self, rows: usize) -> Result<(), CashIifError> {
        if rows > self.max_rows {
            return Err(CashIifError::SecurityViolation(format!(
                "Sheet row count exceeds maximum: {} rows (max: {} rows)",
                rows, self.max_rows
            )));
        }
        Ok(())
    }
}

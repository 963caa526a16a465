//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! 行単位の失敗（日付・金額の解析失敗など）はエラーではなく、
//! `DroppedRow`として変換レポートに記録されます。ここに定義されるのは
//! バッチ全体を中断させる失敗のみです。

use thiserror::Error;

/// cashiifクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー
/// - `Parse`: Excelファイルの解析中に発生したエラー（calamine由来）
/// - `Json`: 設定JSONの解析エラー
/// - `Config`: 設定の検証に失敗したエラー
/// - `InputFormat`: 入力表から1行も射影できないエラー
/// - `SecurityViolation`: 入力サイズ制限に違反したエラー
#[derive(Error, Debug)]
pub enum CashIifError {
    /// I/O操作中に発生したエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー
    ///
    /// ファイル形式が不正、破損したファイル、サポートされていない形式などが
    /// 原因となります。
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// 設定JSONの解析エラー
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。例えば、2つのフィールドが同じ列に割り当てられている場合や、
    /// ラベルにタブ文字が含まれている場合などです。
    ///
    /// # 例
    ///
    /// ```rust
    /// use cashiif::{CashIifError, ColumnMapping, ConverterBuilder};
    ///
    /// let mapping = ColumnMapping { sale_date: 4, ..Default::default() };
    /// let result = ConverterBuilder::new().with_column_mapping(mapping).build();
    ///
    /// assert!(matches!(result, Err(CashIifError::Config(_))));
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// 入力表の形式エラー
    ///
    /// 入力表が空である場合、またはすべての行が必要な列位置に届かない場合に
    /// 発生します。部分的な出力は返されません。
    #[error("Input format error: {0}")]
    InputFormat(String),

    /// セキュリティ制限に違反したエラー
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

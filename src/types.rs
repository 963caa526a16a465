//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//! 生のセルグリッド（`RawTable`）から正規化済みの取引レコード（`TransactionRecord`）まで、
//! パイプラインの各段階で受け渡される型をここに集約します。

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::Field;

/// セルの値を表す列挙型
///
/// スプレッドシートの動的型セルをタグ付きの値として表現します。
/// 射影・正規化の各段階はこの型に対して網羅的にパターンマッチします。
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 文字列
    Text(String),

    /// 数値（f64）
    Number(f64),

    /// 日時（Excelのネイティブ日付セル）
    DateTime(NaiveDateTime),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 文字列セルを生成
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// 値が空、または空白のみの文字列かどうかを判定
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(n) => n.is_nan(),
            CellValue::DateTime(_) => false,
        }
    }

    /// 値を文字列として取得（書式適用前）
    ///
    /// 整数値の数値セルは小数点なしで出力されます（例: `4.0` -> `"4"`）。
    pub fn as_raw_string(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// 生のセルグリッド
///
/// ファイル読み込み側から受け取る、意味付け前の行の並びです。
/// 行の幅は一様であることを保証しません。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// 行のリストからテーブルを生成
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// すべての行を取得
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// 指定インデックスの行を取得
    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 行が1つもないかどうか
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 最も幅の広い行の列数
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// 先頭から`len`行だけを残した新しいテーブルを生成
    pub fn prefix(&self, len: usize) -> RawTable {
        let end = len.min(self.rows.len());
        RawTable::new(self.rows[..end].to_vec())
    }
}

impl From<Vec<Vec<CellValue>>> for RawTable {
    fn from(rows: Vec<Vec<CellValue>>) -> Self {
        RawTable::new(rows)
    }
}

/// 列射影の結果（型付け前の4フィールド）
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRow {
    /// `RawTable`内の行インデックス（0始まり）
    pub source_row: usize,
    pub till_number: CellValue,
    pub sale_date: CellValue,
    pub bill_number: CellValue,
    pub amount: CellValue,
}

/// 正規化済みの取引レコード
///
/// すべてのフィールドが存在し、型付けされていることが保証されます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    /// レジ番号
    pub till_number: String,

    /// 販売日時（秒精度）
    pub sale_date: NaiveDateTime,

    /// 伝票番号（IIFのDOCNUMとして使用）
    pub bill_number: String,

    /// 金額（固定小数点）
    pub amount: Decimal,
}

/// 行が除外された理由
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropReason {
    /// 行の幅が必要な列位置に届かない
    ColumnOutOfRange {
        field: Field,
        column: usize,
        width: usize,
    },

    /// 必須フィールドが空
    MissingField { field: Field },

    /// 日付が既定のパターンに一致しない
    InvalidDate { value: String },

    /// 金額が10進数として解釈できない
    InvalidAmount { value: String },
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::ColumnOutOfRange {
                field,
                column,
                width,
            } => write!(
                f,
                "{} column {} is out of range (row width: {})",
                field, column, width
            ),
            DropReason::MissingField { field } => write!(f, "{} is blank", field),
            DropReason::InvalidDate { value } => write!(f, "invalid sale date: '{}'", value),
            DropReason::InvalidAmount { value } => write!(f, "invalid amount: '{}'", value),
        }
    }
}

/// 除外された行の記録
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRow {
    /// `RawTable`内の行インデックス（0始まり）
    pub row: usize,

    /// 除外理由
    pub reason: DropReason,
}

impl DroppedRow {
    pub fn new(row: usize, reason: DropReason) -> Self {
        Self { row, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_is_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::text("   ").is_blank());
        assert!(CellValue::Number(f64::NAN).is_blank());
        assert!(!CellValue::text("x").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_cell_value_as_raw_string() {
        assert_eq!(CellValue::Number(4.0).as_raw_string(), "4");
        assert_eq!(CellValue::Number(1160.5).as_raw_string(), "1160.5");
        assert_eq!(CellValue::text("1023").as_raw_string(), "1023");
        assert_eq!(CellValue::Empty.as_raw_string(), "");

        let dt = chrono::NaiveDate::from_ymd_opt(2025, 7, 31)
            .unwrap()
            .and_hms_opt(10, 24, 49)
            .unwrap();
        assert_eq!(
            CellValue::DateTime(dt).as_raw_string(),
            "2025-07-31 10:24:49"
        );
    }

    #[test]
    fn test_raw_table_width_with_ragged_rows() {
        let table = RawTable::new(vec![
            vec![CellValue::Empty],
            vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
            vec![],
        ]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.width(), 3);
        assert_eq!(RawTable::default().width(), 0);
    }

    #[test]
    fn test_raw_table_prefix() {
        let table = RawTable::new(vec![
            vec![CellValue::text("a")],
            vec![CellValue::text("b")],
            vec![CellValue::text("c")],
        ]);
        assert_eq!(table.prefix(2).len(), 2);
        assert_eq!(table.prefix(0).len(), 0);
        assert_eq!(table.prefix(10), table);
    }

    #[test]
    fn test_drop_reason_display() {
        let reason = DropReason::MissingField {
            field: Field::SaleDate,
        };
        assert_eq!(reason.to_string(), "sale date is blank");

        let reason = DropReason::ColumnOutOfRange {
            field: Field::Amount,
            column: 25,
            width: 10,
        };
        assert!(reason.to_string().contains("column 25"));
    }
}

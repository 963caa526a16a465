//! Conversion Report Module
//!
//! 1回の変換の結果（生成したIIFテキスト、残ったレコード、除外された行）をまとめる型。
//! 行単位の除外は暗黙ではなく、このレポートを通じて呼び出し側から検証できます。

use serde::Serialize;

use crate::error::CashIifError;
use crate::types::{DroppedRow, TransactionRecord};

/// 変換レポート
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    /// 読み飛ばし後の入力行数
    pub source_rows: usize,

    /// マーカー行のインデックス（見つからなかった場合は`None`）
    pub marker_row: Option<usize>,

    /// 出力されたレコード（元の行順）
    pub records: Vec<TransactionRecord>,

    /// 除外された行（行インデックス順）
    pub dropped: Vec<DroppedRow>,

    /// IIFテキスト
    #[serde(skip)]
    pub output: String,
}

impl ConversionReport {
    /// マーカー行より前にあった行数
    pub fn table_rows(&self) -> usize {
        self.marker_row.unwrap_or(self.source_rows)
    }

    /// 先頭`n`件のレコード（プレビュー用）
    pub fn preview(&self, n: usize) -> &[TransactionRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// 除外された行があるかどうか
    pub fn has_drops(&self) -> bool {
        !self.dropped.is_empty()
    }

    /// IIFテキストを除いたレポートをJSONに変換する
    pub fn to_json(&self) -> Result<String, CashIifError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Field;
    use crate::types::DropReason;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn report() -> ConversionReport {
        let record = TransactionRecord {
            till_number: "4".to_string(),
            sale_date: NaiveDate::from_ymd_opt(2025, 7, 31)
                .unwrap()
                .and_hms_opt(10, 24, 49)
                .unwrap(),
            bill_number: "1023".to_string(),
            amount: Decimal::new(116000, 2),
        };
        ConversionReport {
            source_rows: 5,
            marker_row: Some(3),
            records: vec![record.clone(), record],
            dropped: vec![DroppedRow::new(
                2,
                DropReason::MissingField {
                    field: Field::SaleDate,
                },
            )],
            output: "!TRNS".to_string(),
        }
    }

    #[test]
    fn test_preview() {
        let report = report();
        assert_eq!(report.preview(1).len(), 1);
        assert_eq!(report.preview(10).len(), 2);
        assert_eq!(report.preview(0).len(), 0);
    }

    #[test]
    fn test_table_rows() {
        let mut report = report();
        assert_eq!(report.table_rows(), 3);
        report.marker_row = None;
        assert_eq!(report.table_rows(), 5);
    }

    #[test]
    fn test_to_json() {
        let json = report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["source_rows"], 5);
        assert_eq!(value["marker_row"], 3);
        assert_eq!(value["records"][0]["bill_number"], "1023");
        assert_eq!(value["dropped"][0]["row"], 2);
        assert_eq!(value["dropped"][0]["reason"]["kind"], "missing_field");
        assert_eq!(value["dropped"][0]["reason"]["field"], "sale_date");
        assert!(value.get("output").is_none());
    }
}

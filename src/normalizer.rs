//! Record Normalizer Module
//!
//! 射影済みの行を型付けし、`TransactionRecord`へ正規化するモジュール。
//! 正規化できない行はバッチを中断せず、除外理由とともに記録されます。

use std::str::FromStr;

use chrono::{NaiveDateTime, SubsecRound};
use rust_decimal::Decimal;

use crate::api::Field;
use crate::types::{CellValue, DropReason, DroppedRow, ProjectedRow, TransactionRecord};

/// 販売日時の書式（例: `31-Jul-2025 10.24.49 AM`）
///
/// 12時間制で、時刻の区切りはピリオドです。
pub const SALE_DATE_FORMAT: &str = "%d-%b-%Y %I.%M.%S %p";

/// 正規化の結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    /// 正規化できたレコード（元の行順を保持）
    pub records: Vec<TransactionRecord>,

    /// 除外された行
    pub dropped: Vec<DroppedRow>,
}

/// レコードノーマライザー
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNormalizer;

impl RecordNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// 射影済みの行をまとめて正規化する
    pub fn normalize(&self, rows: &[ProjectedRow]) -> Normalized {
        let mut normalized = Normalized::default();

        for row in rows {
            match self.normalize_row(row) {
                Ok(record) => normalized.records.push(record),
                Err(reason) => {
                    log::warn!("Row {} dropped: {}", row.source_row, reason);
                    normalized
                        .dropped
                        .push(DroppedRow::new(row.source_row, reason));
                }
            }
        }

        log::debug!(
            "Normalized {} of {} rows",
            normalized.records.len(),
            rows.len()
        );
        normalized
    }

    /// 1行を正規化する
    ///
    /// 日付または金額が空の行は、解析を試みる前に除外されます。
    /// レジ番号・伝票番号が空の行も、仕訳のメモと伝票番号が欠けるため除外されます。
    pub fn normalize_row(&self, row: &ProjectedRow) -> Result<TransactionRecord, DropReason> {
        if row.sale_date.is_blank() {
            return Err(DropReason::MissingField {
                field: Field::SaleDate,
            });
        }
        if row.amount.is_blank() {
            return Err(DropReason::MissingField {
                field: Field::Amount,
            });
        }
        if row.till_number.is_blank() {
            return Err(DropReason::MissingField {
                field: Field::TillNumber,
            });
        }
        if row.bill_number.is_blank() {
            return Err(DropReason::MissingField {
                field: Field::BillNumber,
            });
        }

        let sale_date = normalize_sale_date(&row.sale_date)?;
        let amount = normalize_amount(&row.amount)?;

        Ok(TransactionRecord {
            till_number: row.till_number.as_raw_string(),
            sale_date,
            bill_number: row.bill_number.as_raw_string(),
            amount,
        })
    }
}

/// 日付セルを正規化する
///
/// ネイティブの日付セルはそのまま秒精度に丸めて受け入れます。
pub fn normalize_sale_date(cell: &CellValue) -> Result<NaiveDateTime, DropReason> {
    match cell {
        CellValue::Text(s) => parse_sale_date(s).ok_or_else(|| DropReason::InvalidDate {
            value: s.clone(),
        }),
        CellValue::DateTime(dt) => Ok(dt.round_subsecs(0)),
        CellValue::Number(_) => Err(DropReason::InvalidDate {
            value: cell.as_raw_string(),
        }),
        CellValue::Empty => Err(DropReason::MissingField {
            field: Field::SaleDate,
        }),
    }
}

/// 金額セルを正規化する
pub fn normalize_amount(cell: &CellValue) -> Result<Decimal, DropReason> {
    match cell {
        CellValue::Text(s) => parse_amount(s).ok_or_else(|| DropReason::InvalidAmount {
            value: s.clone(),
        }),
        CellValue::Number(n) => Decimal::try_from(*n).map_err(|_| DropReason::InvalidAmount {
            value: cell.as_raw_string(),
        }),
        CellValue::DateTime(_) => Err(DropReason::InvalidAmount {
            value: cell.as_raw_string(),
        }),
        CellValue::Empty => Err(DropReason::MissingField {
            field: Field::Amount,
        }),
    }
}

/// 日付文字列を解析する
///
/// 連続する空白を1つにまとめ、前後の空白を除去してから
/// `SALE_DATE_FORMAT`で解析します。年は4桁のみ受け付けます
/// （`%Y`は桁数を問わないため、`31-Jul-25`が0025年になるのを防ぐ）。
pub fn parse_sale_date(raw: &str) -> Option<NaiveDateTime> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !has_four_digit_year(&collapsed) {
        return None;
    }
    NaiveDateTime::parse_from_str(&collapsed, SALE_DATE_FORMAT).ok()
}

/// `DD-Mon-YYYY ...`の年の部分がちょうど4桁の数字かどうか
fn has_four_digit_year(date: &str) -> bool {
    let day_part = date.split(' ').next().unwrap_or_default();
    match day_part.splitn(3, '-').nth(2) {
        Some(year) => year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// 金額文字列を解析する
///
/// 桁区切りのカンマを除去してから10進数として解析します。
/// 指数表記・通貨記号・括弧による負数表記は受け付けません。
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let stripped: String = raw.chars().filter(|c| *c != ',').collect();
    let stripped = stripped.trim();
    if stripped.is_empty() {
        return None;
    }
    Decimal::from_str(stripped).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn projected(date: CellValue, amount: CellValue) -> ProjectedRow {
        ProjectedRow {
            source_row: 7,
            till_number: CellValue::text("4"),
            sale_date: date,
            bill_number: CellValue::text("1023"),
            amount,
        }
    }

    fn expected_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 31)
            .unwrap()
            .and_hms_opt(10, 24, 49)
            .unwrap()
    }

    #[test]
    fn test_parse_sale_date_collapses_whitespace() {
        assert_eq!(
            parse_sale_date("31-Jul-2025  10.24.49 AM"),
            Some(expected_date())
        );
        assert_eq!(
            parse_sale_date("  31-Jul-2025 \t 10.24.49   AM "),
            Some(expected_date())
        );
    }

    #[test]
    fn test_parse_sale_date_twelve_hour_clock() {
        let pm = parse_sale_date("01-Aug-2025 01.05.09 PM").unwrap();
        assert_eq!(
            pm,
            NaiveDate::from_ymd_opt(2025, 8, 1)
                .unwrap()
                .and_hms_opt(13, 5, 9)
                .unwrap()
        );

        let midnight = parse_sale_date("01-Aug-2025 12.00.00 AM").unwrap();
        assert_eq!(
            midnight,
            NaiveDate::from_ymd_opt(2025, 8, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_sale_date_rejects_other_patterns() {
        assert_eq!(parse_sale_date("2025-07-31 10:24:49"), None);
        assert_eq!(parse_sale_date("31-Jul-2025 10:24:49 AM"), None);
        assert_eq!(parse_sale_date("31-Jul-2025"), None);
        assert_eq!(parse_sale_date("32-Jul-2025 10.24.49 AM"), None);
        assert_eq!(parse_sale_date(""), None);
    }

    #[test]
    fn test_parse_sale_date_requires_four_digit_year() {
        assert_eq!(parse_sale_date("31-Jul-25 10.24.49 AM"), None);
        assert_eq!(parse_sale_date("31-Jul-02025 10.24.49 AM"), None);
        assert_eq!(parse_sale_date("31-Jul-+025 10.24.49 AM"), None);
        assert_eq!(
            parse_sale_date("1-Jul-2025 10.24.49 AM").map(|d| d.date()),
            NaiveDate::from_ymd_opt(2025, 7, 1)
        );

        let row = projected(
            CellValue::text("31-Jul-25 10.24.49 AM"),
            CellValue::text("10.00"),
        );
        assert_eq!(
            RecordNormalizer::new().normalize_row(&row),
            Err(DropReason::InvalidDate {
                value: "31-Jul-25 10.24.49 AM".to_string()
            })
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,160.00"), Some(Decimal::new(116000, 2)));
        assert_eq!(parse_amount("1,234,567.89"), Some(Decimal::new(123456789, 2)));
        assert_eq!(parse_amount(" 42 "), Some(Decimal::new(42, 0)));
        assert_eq!(parse_amount("-5.50"), Some(Decimal::new(-550, 2)));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(","), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn test_normalize_row() {
        let row = projected(
            CellValue::text("31-Jul-2025  10.24.49 AM"),
            CellValue::text("1,160.00"),
        );
        let record = RecordNormalizer::new().normalize_row(&row).unwrap();

        assert_eq!(record.till_number, "4");
        assert_eq!(record.bill_number, "1023");
        assert_eq!(record.sale_date, expected_date());
        assert_eq!(record.amount, Decimal::new(116000, 2));
    }

    #[test]
    fn test_normalize_native_cells() {
        let row = projected(
            CellValue::DateTime(expected_date()),
            CellValue::Number(1160.0),
        );
        let record = RecordNormalizer::new().normalize_row(&row).unwrap();
        assert_eq!(record.sale_date, expected_date());
        assert_eq!(record.amount, Decimal::new(1160, 0));
    }

    #[test]
    fn test_native_date_is_rounded_to_seconds() {
        let dt = expected_date() + chrono::Duration::milliseconds(999);
        assert_eq!(
            normalize_sale_date(&CellValue::DateTime(dt)).unwrap(),
            expected_date() + chrono::Duration::seconds(1)
        );
    }

    #[test]
    fn test_numeric_identifiers_render_without_fraction() {
        let row = ProjectedRow {
            source_row: 0,
            till_number: CellValue::Number(4.0),
            sale_date: CellValue::text("31-Jul-2025 10.24.49 AM"),
            bill_number: CellValue::Number(1023.0),
            amount: CellValue::Number(10.5),
        };
        let record = RecordNormalizer::new().normalize_row(&row).unwrap();
        assert_eq!(record.till_number, "4");
        assert_eq!(record.bill_number, "1023");
    }

    #[test]
    fn test_blank_fields_are_prefiltered() {
        let normalizer = RecordNormalizer::new();

        let row = projected(CellValue::Empty, CellValue::text("not a number"));
        assert_eq!(
            normalizer.normalize_row(&row),
            Err(DropReason::MissingField {
                field: Field::SaleDate
            })
        );

        let row = projected(CellValue::text("31-Jul-2025 10.24.49 AM"), CellValue::text("  "));
        assert_eq!(
            normalizer.normalize_row(&row),
            Err(DropReason::MissingField {
                field: Field::Amount
            })
        );
    }

    #[test]
    fn test_blank_identifiers_are_dropped() {
        let normalizer = RecordNormalizer::new();
        let valid = projected(
            CellValue::text("31-Jul-2025 10.24.49 AM"),
            CellValue::text("10.00"),
        );

        let row = ProjectedRow {
            till_number: CellValue::Empty,
            bill_number: CellValue::Empty,
            ..valid.clone()
        };
        assert_eq!(
            normalizer.normalize_row(&row),
            Err(DropReason::MissingField {
                field: Field::TillNumber
            })
        );

        let row = ProjectedRow {
            bill_number: CellValue::text(" "),
            ..valid.clone()
        };
        assert_eq!(
            normalizer.normalize_row(&row),
            Err(DropReason::MissingField {
                field: Field::BillNumber
            })
        );

        // 日付・金額の判定が優先される
        let row = ProjectedRow {
            sale_date: CellValue::Empty,
            bill_number: CellValue::Empty,
            ..valid
        };
        assert_eq!(
            normalizer.normalize_row(&row),
            Err(DropReason::MissingField {
                field: Field::SaleDate
            })
        );
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let normalizer = RecordNormalizer::new();

        let row = projected(CellValue::text("yesterday"), CellValue::text("10"));
        assert_eq!(
            normalizer.normalize_row(&row),
            Err(DropReason::InvalidDate {
                value: "yesterday".to_string()
            })
        );

        let row = projected(CellValue::Number(45869.0), CellValue::text("10"));
        assert!(matches!(
            normalizer.normalize_row(&row),
            Err(DropReason::InvalidDate { .. })
        ));

        let row = projected(
            CellValue::text("31-Jul-2025 10.24.49 AM"),
            CellValue::text("N/A"),
        );
        assert_eq!(
            normalizer.normalize_row(&row),
            Err(DropReason::InvalidAmount {
                value: "N/A".to_string()
            })
        );
    }

    #[test]
    fn test_normalize_keeps_survivors_in_order() {
        let rows = vec![
            projected(CellValue::text("31-Jul-2025 10.24.49 AM"), CellValue::text("1")),
            ProjectedRow {
                source_row: 8,
                ..projected(CellValue::Empty, CellValue::text("2"))
            },
            ProjectedRow {
                source_row: 9,
                bill_number: CellValue::text("1024"),
                ..projected(CellValue::text("31-Jul-2025 10.30.00 AM"), CellValue::text("3"))
            },
        ];

        let normalized = RecordNormalizer::new().normalize(&rows);
        assert_eq!(normalized.records.len(), 2);
        assert_eq!(normalized.records[0].amount, Decimal::new(1, 0));
        assert_eq!(normalized.records[1].bill_number, "1024");
        assert_eq!(normalized.dropped.len(), 1);
        assert_eq!(normalized.dropped[0].row, 8);
    }

    #[allow(unused_doc_comments)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn with_thousands_separators(mut n: u64) -> String {
            let mut groups = Vec::new();
            loop {
                if n < 1000 {
                    groups.push(n.to_string());
                    break;
                }
                groups.push(format!("{:03}", n % 1000));
                n /= 1000;
            }
            groups.reverse();
            groups.join(",")
        }

        #[allow(unused_doc_comments)]
        /// 桁区切り付きの金額は、区切りなしの値と同じ10進数に解析される
        proptest! {
            #[test]
            fn test_amount_with_separators(whole in 0u64..1_000_000_000_000, cents in 0u64..100) {
                let raw = format!("{}.{:02}", with_thousands_separators(whole), cents);
                let expected = Decimal::new((whole * 100 + cents) as i64, 2);
                prop_assert_eq!(parse_amount(&raw), Some(expected));
            }
        }
    }
}

//! IIF Encoder Implementation
//!
//! タブ区切りのIIF（Intuit Interchange Format）を生成する実装。

use std::io::Write;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::LedgerLabels;
use crate::error::CashIifError;
use crate::types::TransactionRecord;

/// IIFのヘッダー指令行（出力の先頭に1回だけ出力）
pub const IIF_HEADER_LINES: [&str; 3] = [
    "!TRNS\tTRNSTYPE\tDATE\tACCNT\tNAME\tMEMO\tAMOUNT\tDOCNUM",
    "!SPL\tTRNSTYPE\tDATE\tACCNT\tNAME\tMEMO\tAMOUNT\tQNTY\tINVITEM",
    "!ENDTRNS",
];

const END_OF_TRANSACTION: &str = "ENDTRNS";
const DATE_FORMAT: &str = "%m/%d/%Y";

/// 金額をIIF用の10進表記に変換する
///
/// 末尾のゼロを取り除いた最短の表記で、小数部を最低1桁出力します。
/// 桁区切りは付けません（例: `1160.00` -> `1160.0`, `-12.50` -> `-12.5`）。
pub fn format_amount(amount: Decimal) -> String {
    if amount.is_zero() {
        return "0.0".to_string();
    }

    let normalized = amount.normalize();
    if normalized.scale() == 0 {
        format!("{}.0", normalized)
    } else {
        normalized.to_string()
    }
}

/// タブと改行は行構造を壊すため空白に置き換える
fn sanitize(field: &str) -> String {
    field.replace(|c: char| matches!(c, '\t' | '\r' | '\n'), " ")
}

/// 仕訳の片側（勘定と金額）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerLine {
    pub account: String,
    pub amount: Decimal,
}

/// 1件の取引レコードから導出される、貸借一致の仕訳
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub transaction_type: String,
    pub date: NaiveDate,
    pub name: String,
    pub memo: String,
    pub document_number: String,

    /// 借方（TRNS行）
    pub debit: LedgerLine,

    /// 貸方（SPL行）
    pub credit: LedgerLine,
}

impl LedgerEntry {
    /// 取引レコードから仕訳を生成する
    pub fn from_record(record: &TransactionRecord, labels: &LedgerLabels) -> Self {
        let till = sanitize(&record.till_number);
        let bill = sanitize(&record.bill_number);

        Self {
            transaction_type: labels.transaction_type.clone(),
            date: record.sale_date.date(),
            name: labels.name.clone(),
            memo: format!("Till {} | Invoice {}", till, bill),
            document_number: bill,
            debit: LedgerLine {
                account: labels.debit_account.clone(),
                amount: record.amount,
            },
            credit: LedgerLine {
                account: labels.credit_account.clone(),
                amount: -record.amount,
            },
        }
    }

    /// 借方と貸方の合計がゼロかどうか
    pub fn is_balanced(&self) -> bool {
        (self.debit.amount + self.credit.amount).is_zero()
    }

    /// TRNS行
    pub fn transaction_line(&self) -> String {
        let date = self.date.format(DATE_FORMAT).to_string();
        let amount = format_amount(self.debit.amount);
        let fields: [&str; 8] = [
            "TRNS",
            &self.transaction_type,
            &date,
            &self.debit.account,
            &self.name,
            &self.memo,
            &amount,
            &self.document_number,
        ];
        fields.join("\t")
    }

    /// SPL行（数量と品目は空）
    pub fn split_line(&self) -> String {
        let date = self.date.format(DATE_FORMAT).to_string();
        let amount = format_amount(self.credit.amount);
        let fields: [&str; 9] = [
            "SPL",
            &self.transaction_type,
            &date,
            &self.credit.account,
            &self.name,
            &self.memo,
            &amount,
            "",
            "",
        ];
        fields.join("\t")
    }

    /// この仕訳を構成する3行（TRNS, SPL, ENDTRNS）
    pub fn lines(&self) -> [String; 3] {
        [
            self.transaction_line(),
            self.split_line(),
            END_OF_TRANSACTION.to_string(),
        ]
    }
}

/// IIFエンコーダー
#[derive(Debug, Clone, Default)]
pub struct IifEncoder {
    labels: LedgerLabels,
}

impl IifEncoder {
    pub fn new(labels: LedgerLabels) -> Self {
        Self { labels }
    }

    /// レコード列を仕訳列に変換する
    pub fn entries(&self, records: &[TransactionRecord]) -> Vec<LedgerEntry> {
        records
            .iter()
            .map(|record| LedgerEntry::from_record(record, &self.labels))
            .collect()
    }

    /// レコード列をIIFテキストとして書き出す
    ///
    /// # 引数
    ///
    /// * `records` - 出力する取引レコード（この順で出力）
    /// * `writer` - 出力先のライター
    pub fn encode<W: Write>(
        &self,
        records: &[TransactionRecord],
        writer: &mut W,
    ) -> Result<(), CashIifError> {
        writer.write_all(self.encode_to_string(records).as_bytes())?;
        Ok(())
    }

    /// レコード列をIIFテキストに変換する
    ///
    /// 各行は改行1文字で終端されます。
    pub fn encode_to_string(&self, records: &[TransactionRecord]) -> String {
        let mut output = String::new();

        for header in IIF_HEADER_LINES {
            output.push_str(header);
            output.push('\n');
        }

        for entry in self.entries(records) {
            for line in entry.lines() {
                output.push_str(&line);
                output.push('\n');
            }
        }

        output
    }
}

//! Public API Types
//!
//! 公開APIで使用する設定型・列挙型を定義するモジュール。

use serde::{Deserialize, Serialize};

use crate::error::CashIifError;

/// 出力ファイル名（ダウンロード時の既定名）
pub const IIF_FILE_NAME: &str = "cash_sales.iif";

/// 出力ファイルの拡張子
pub const IIF_EXTENSION: &str = "iif";

/// 出力のコンテンツタイプ
pub const IIF_CONTENT_TYPE: &str = "text/plain";

/// プレビューとして表示する既定の行数
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// 表の開始前に読み飛ばす行数（固定ヘッダー・ロゴ領域）
pub const DEFAULT_SKIP_ROWS: u32 = 16;

/// 取引表の終端を示すフレーズ
pub const DEFAULT_MARKER_PHRASE: &str = "Total Amount for";

/// 取引レコードの意味フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    TillNumber,
    SaleDate,
    BillNumber,
    Amount,
}

impl Field {
    /// すべてのフィールド（射影順）
    pub const ALL: [Field; 4] = [
        Field::TillNumber,
        Field::SaleDate,
        Field::BillNumber,
        Field::Amount,
    ];
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::TillNumber => "till number",
            Field::SaleDate => "sale date",
            Field::BillNumber => "bill number",
            Field::Amount => "amount",
        };
        f.write_str(name)
    }
}

/// シートの選択方式
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SheetSelector {
    /// 先頭のシート（デフォルト）
    #[default]
    First,

    /// インデックスで指定（0始まり）
    Index(usize),

    /// シート名で指定
    Name(String),
}

/// 意味フィールドから列インデックス（0始まり）への対応表
///
/// POSエクスポートの列位置は外部フォーマットの固定契約です。
/// レイアウトが変わった場合は、この対応表を差し替えるだけで追従できます。
///
/// # 使用例
///
/// ```rust
/// use cashiif::{ColumnMapping, Field};
///
/// let mapping = ColumnMapping::from_json(r#"{ "amount": 30 }"#).unwrap();
/// assert_eq!(mapping.index(Field::Amount), 30);
/// assert_eq!(mapping.index(Field::TillNumber), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMapping {
    pub till_number: usize,
    pub sale_date: usize,
    pub bill_number: usize,
    pub amount: usize,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            till_number: 4,
            sale_date: 9,
            bill_number: 15,
            amount: 25,
        }
    }
}

impl ColumnMapping {
    /// JSON文字列から対応表を読み込む
    ///
    /// 省略されたフィールドはデフォルトの列位置になります。
    pub fn from_json(json: &str) -> Result<Self, CashIifError> {
        let mapping: ColumnMapping = serde_json::from_str(json)?;
        mapping.validate()?;
        Ok(mapping)
    }

    /// フィールドに対応する列インデックス
    pub fn index(&self, field: Field) -> usize {
        match field {
            Field::TillNumber => self.till_number,
            Field::SaleDate => self.sale_date,
            Field::BillNumber => self.bill_number,
            Field::Amount => self.amount,
        }
    }

    /// 最も右にある必要列のインデックス
    pub fn max_index(&self) -> usize {
        Field::ALL
            .iter()
            .map(|field| self.index(*field))
            .max()
            .unwrap_or(0)
    }

    /// 対応表を検証する（同じ列に2つのフィールドを割り当てることはできない）
    pub fn validate(&self) -> Result<(), CashIifError> {
        for (i, a) in Field::ALL.iter().enumerate() {
            for b in &Field::ALL[i + 1..] {
                if self.index(*a) == self.index(*b) {
                    return Err(CashIifError::Config(format!(
                        "Column {} is mapped to both {} and {}",
                        self.index(*a),
                        a,
                        b
                    )));
                }
            }
        }
        Ok(())
    }
}

/// IIF出力に使用する固定ラベル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerLabels {
    /// 取引種別（TRNSTYPE）
    pub transaction_type: String,

    /// 借方勘定（TRNS行のACCNT）
    pub debit_account: String,

    /// 貸方勘定（SPL行のACCNT）
    pub credit_account: String,

    /// 取引先（NAME）
    pub name: String,
}

impl Default for LedgerLabels {
    fn default() -> Self {
        Self {
            transaction_type: "PAYMENT".to_string(),
            debit_account: "Cash in Drawer".to_string(),
            credit_account: "Accounts Receivable".to_string(),
            name: "Walk In".to_string(),
        }
    }
}

impl LedgerLabels {
    /// JSON文字列からラベルを読み込む
    pub fn from_json(json: &str) -> Result<Self, CashIifError> {
        let labels: LedgerLabels = serde_json::from_str(json)?;
        labels.validate()?;
        Ok(labels)
    }

    /// ラベルを検証する
    ///
    /// 空のラベルと、タブ・改行を含むラベルはIIFの行構造を壊すため拒否します。
    pub fn validate(&self) -> Result<(), CashIifError> {
        let labels = [
            ("transaction_type", &self.transaction_type),
            ("debit_account", &self.debit_account),
            ("credit_account", &self.credit_account),
            ("name", &self.name),
        ];
        for (key, value) in labels {
            if value.trim().is_empty() {
                return Err(CashIifError::Config(format!(
                    "Ledger label '{}' must not be empty",
                    key
                )));
            }
            if value.contains(|c: char| matches!(c, '\t' | '\n' | '\r')) {
                return Err(CashIifError::Config(format!(
                    "Ledger label '{}' must not contain tabs or line breaks",
                    key
                )));
            }
        }
        Ok(())
    }
}

//! cashiif - Convert point-of-sale cash sales exports into QuickBooks IIF ledgers
//!
//! POSシステムが出力する現金売上のExcelファイル（固定ヘッダー、固定列位置、
//! 末尾の集計ブロックを持つ半構造化シート）を読み込み、外部会計システムが
//! 取り込めるタブ区切りの複式簿記仕訳（IIF）を生成します。
//!
//! 処理は4段階の純粋な変換で構成されます。
//!
//! 1. **Row Scanner** (`scanner`): `Total Amount for`を含む最初の行を探し、それ以降を破棄
//! 2. **Column Projector** (`projector`): 固定列位置から4フィールドを取り出す
//! 3. **Record Normalizer** (`normalizer`): 日付・金額を型付けし、失敗した行を除外
//! 4. **Ledger Encoder** (`output`): 各レコードを貸借一致の2行仕訳としてIIFに出力
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use cashiif::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     let input = File::open("cash_sales.xlsx")?;
//!     let output = File::create("cash_sales.iif")?;
//!
//!     let report = converter.convert(input, output)?;
//!     for dropped in &report.dropped {
//!         eprintln!("row {}: {}", dropped.row, dropped.reason);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Converting an already-decoded table
//!
//! ```rust
//! use cashiif::{CellValue, ConverterBuilder, RawTable};
//!
//! # fn main() -> Result<(), cashiif::CashIifError> {
//! let mut row = vec![CellValue::Empty; 26];
//! row[4] = CellValue::text("4");
//! row[9] = CellValue::text("31-Jul-2025  10.24.49 AM");
//! row[15] = CellValue::text("1023");
//! row[25] = CellValue::text("1,160.00");
//!
//! let table = RawTable::new(vec![row, vec![CellValue::text("Total Amount for Jane")]]);
//! let report = ConverterBuilder::new().build()?.convert_table(&table)?;
//!
//! assert!(report.output.contains("\t1160.0\t1023\n"));
//! assert!(report.output.contains("\t-1160.0\t\t\n"));
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod error;
mod normalizer;
mod output;
mod parser;
mod projector;
mod report;
mod scanner;
mod security;
mod types;

// 公開API
pub use api::{
    ColumnMapping, Field, LedgerLabels, SheetSelector, DEFAULT_MARKER_PHRASE,
    DEFAULT_PREVIEW_ROWS, DEFAULT_SKIP_ROWS, IIF_CONTENT_TYPE, IIF_EXTENSION, IIF_FILE_NAME,
};
pub use builder::{Converter, ConverterBuilder};
pub use error::CashIifError;
pub use normalizer::{
    normalize_amount, normalize_sale_date, parse_amount, parse_sale_date, Normalized,
    RecordNormalizer, SALE_DATE_FORMAT,
};
pub use output::{format_amount, IifEncoder, LedgerEntry, LedgerLine, IIF_HEADER_LINES};
pub use projector::{ColumnProjector, Projection};
pub use report::ConversionReport;
pub use scanner::{find_marker_row, truncate_at_marker, RowScanner};
pub use security::SecurityConfig;
pub use types::{CellValue, DropReason, DroppedRow, ProjectedRow, RawTable, TransactionRecord};

//! Parser Module
//!
//! calamineを使用したExcelファイル読み込みの実装。
//! ワークシートを`RawTable`に変換し、取引表の手前にある固定ヘッダー行を読み飛ばします。

mod workbook;

pub(crate) use workbook::WorkbookParser;

//! Output Module
//!
//! 正規化済みの取引レコードを、外部会計システム向けの交換フォーマット（IIF）に
//! 変換するモジュール。
//!
//! 各レコードは、借方（現金）と貸方（売掛金）が必ず相殺される2行の仕訳として出力されます。

mod iif;

pub use iif::{format_amount, IifEncoder, LedgerEntry, LedgerLine, IIF_HEADER_LINES};

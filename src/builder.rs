//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::io::{BufWriter, Read, Write};

use crate::api::{
    ColumnMapping, LedgerLabels, SheetSelector, DEFAULT_MARKER_PHRASE, DEFAULT_SKIP_ROWS,
};
use crate::error::CashIifError;
use crate::normalizer::RecordNormalizer;
use crate::output::IifEncoder;
use crate::projector::ColumnProjector;
use crate::report::ConversionReport;
use crate::scanner::RowScanner;
use crate::security::SecurityConfig;
use crate::types::RawTable;

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 表の前に読み飛ばす行数
    pub skip_rows: u32,

    /// 列の対応表
    pub column_mapping: ColumnMapping,

    /// IIFのラベル
    pub labels: LedgerLabels,

    /// 取引表の終端を示すフレーズ
    pub marker_phrase: String,

    /// 資源制限
    pub security: SecurityConfig,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::First,
            skip_rows: DEFAULT_SKIP_ROWS,
            column_mapping: ColumnMapping::default(),
            labels: LedgerLabels::default(),
            marker_phrase: DEFAULT_MARKER_PHRASE.to_string(),
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use cashiif::{ColumnMapping, ConverterBuilder, SheetSelector};
///
/// # fn main() -> Result<(), cashiif::CashIifError> {
/// let converter = ConverterBuilder::new()
///     .with_sheet_selector(SheetSelector::Name("Cash Sales".to_string()))
///     .with_skip_rows(16)
///     .with_column_mapping(ColumnMapping::from_json(r#"{ "amount": 26 }"#)?)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: 先頭のシート
    /// - 読み飛ばし行数: 16
    /// - 列位置: レジ番号=4, 日付=9, 伝票番号=15, 金額=25
    /// - ラベル: `PAYMENT` / `Cash in Drawer` / `Accounts Receivable` / `Walk In`
    /// - マーカー: `Total Amount for`
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// 変換対象のシートを選択する
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 取引表の前に読み飛ばす行数を指定する
    pub fn with_skip_rows(mut self, rows: u32) -> Self {
        self.config.skip_rows = rows;
        self
    }

    /// 列の対応表を指定する
    pub fn with_column_mapping(mut self, mapping: ColumnMapping) -> Self {
        self.config.column_mapping = mapping;
        self
    }

    /// IIFのラベルを指定する
    pub fn with_labels(mut self, labels: LedgerLabels) -> Self {
        self.config.labels = labels;
        self
    }

    /// 取引表の終端を示すフレーズを指定する
    pub fn with_marker_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.config.marker_phrase = phrase.into();
        self
    }

    /// 資源制限を指定する
    pub fn with_security_config(mut self, security: SecurityConfig) -> Self {
        self.config.security = security;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `CashIifError::Config(String)`: 設定の検証に失敗した場合
    ///   * 2つのフィールドが同じ列に割り当てられている
    ///   * ラベルが空、またはタブ・改行を含む
    ///   * マーカーフレーズが空
    pub fn build(self) -> Result<Converter, CashIifError> {
        // 1. 列の対応表の検証
        self.config.column_mapping.validate()?;

        // 2. ラベルの検証
        self.config.labels.validate()?;

        // 3. マーカーフレーズの検証（正規表現の構築を兼ねる）
        let scanner = RowScanner::new(&self.config.marker_phrase)?;

        Ok(Converter::new(self.config, scanner))
    }
}

/// 変換処理のファサード
///
/// POSエクスポートのExcelファイルをIIF形式に変換するためのメインエントリーポイントです。
/// 各段階は共有状態を持たない純粋な変換であり、1つの`Converter`を複数の入力に
/// 繰り返し（あるいは並行して）使用できます。
///
/// # 使用例
///
/// ```rust,no_run
/// use cashiif::ConverterBuilder;
/// use std::fs::File;
///
/// # fn main() -> Result<(), cashiif::CashIifError> {
/// let converter = ConverterBuilder::new().build()?;
/// let input = File::open("cash_sales.xlsx")?;
/// let output = File::create("cash_sales.iif")?;
/// let report = converter.convert(input, output)?;
/// println!("{} records, {} rows dropped", report.records.len(), report.dropped.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    config: ConversionConfig,
    scanner: RowScanner,
    projector: ColumnProjector,
    normalizer: RecordNormalizer,
    encoder: IifEncoder,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig, scanner: RowScanner) -> Self {
        Self {
            projector: ColumnProjector::new(config.column_mapping),
            normalizer: RecordNormalizer::new(),
            encoder: IifEncoder::new(config.labels.clone()),
            scanner,
            config,
        }
    }

    /// Excelファイルを読み込み、読み飛ばし行を除いた`RawTable`を返す
    pub fn read_table<R: Read>(&self, input: R) -> Result<RawTable, CashIifError> {
        let mut parser = crate::parser::WorkbookParser::open(input, &self.config.security)?;
        let sheet_name = parser.select_sheet(&self.config.sheet_selector)?;
        parser.read_table(&sheet_name, self.config.skip_rows, &self.config.security)
    }

    /// `RawTable`をIIFに変換する
    ///
    /// # 処理フロー
    ///
    /// 1. マーカー行を探し、それ以降を切り捨てる
    /// 2. 固定列を4フィールドに射影する
    /// 3. 各行を正規化する（失敗した行は除外）
    /// 4. IIFテキストを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConversionReport)` - 変換結果（レコードが0件でもヘッダーのみのIIFを含む）
    /// * `Err(CashIifError::InputFormat)` - 入力が空、またはどの行も必要な列に届かない場合
    pub fn convert_table(&self, table: &RawTable) -> Result<ConversionReport, CashIifError> {
        if table.is_empty() {
            return Err(CashIifError::InputFormat(
                "Input table contains no rows".to_string(),
            ));
        }

        // 1. 終端の検出
        let marker_row = self.scanner.find_marker_row(table);
        let truncated = match marker_row {
            Some(index) => table.prefix(index),
            None => table.clone(),
        };
        log::debug!(
            "Transaction table spans {} of {} rows (marker: {:?})",
            truncated.len(),
            table.len(),
            marker_row
        );

        // 2. 列の射影
        let projection = self.projector.project(&truncated)?;

        // 3. 正規化
        let normalized = self.normalizer.normalize(&projection.rows);

        // 4. IIFの生成
        let output = self.encoder.encode_to_string(&normalized.records);

        let mut dropped = projection.dropped;
        dropped.extend(normalized.dropped);
        dropped.sort_by_key(|d| d.row);

        log::info!(
            "Converted {} records ({} rows dropped)",
            normalized.records.len(),
            dropped.len()
        );

        Ok(ConversionReport {
            source_rows: table.len(),
            marker_row,
            records: normalized.records,
            dropped,
            output,
        })
    }

    /// ExcelファイルをIIF形式に変換して書き出す
    ///
    /// # 引数
    ///
    /// * `input` - Excelファイルを読み込むためのリーダー
    /// * `output` - IIF出力先のライター
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConversionReport)` - 変換に成功した場合
    /// * `Err(CashIifError)` - エラーが発生した場合（この場合、出力には何も書き込まれない）
    pub fn convert<R: Read, W: Write>(
        &self,
        input: R,
        mut output: W,
    ) -> Result<ConversionReport, CashIifError> {
        let table = self.read_table(input)?;
        let report = self.convert_table(&table)?;

        let mut writer = BufWriter::new(&mut output);
        writer.write_all(report.output.as_bytes())?;
        writer.flush()?;

        Ok(report)
    }

    /// ExcelファイルをIIF形式の文字列に変換
    pub fn convert_to_string<R: Read>(&self, input: R) -> Result<String, CashIifError> {
        let table = self.read_table(input)?;
        Ok(self.convert_table(&table)?.output)
    }
}

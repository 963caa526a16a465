//! Workbook Parser
//!
//! calamineのラッパーとして、ワークブックレベルの操作を提供します。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::{Cursor, Read, Seek};

use crate::api::SheetSelector;
use crate::error::CashIifError;
use crate::security::SecurityConfig;
use crate::types::{CellValue, RawTable};

/// ワークブックパーサー
pub(crate) struct WorkbookParser<R: Read + Seek> {
    /// calamineのワークブック（XLSX形式のみサポート）
    workbook: Xlsx<R>,
}

impl WorkbookParser<Cursor<Vec<u8>>> {
    /// ワークブックを開く
    ///
    /// 入力全体をメモリに読み込み、サイズ制限を検証してからcalamineで解析します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - ワークブックの読み込みに成功した場合
    /// * `Err(CashIifError::SecurityViolation)` - 入力サイズが上限を超えた場合
    /// * `Err(CashIifError::Parse)` - ワークブックの解析に失敗した場合
    /// * `Err(CashIifError::InputFormat)` - XLSX以外の形式の場合
    pub fn open<R: Read>(mut reader: R, security: &SecurityConfig) -> Result<Self, CashIifError> {
        let mut buffer = Vec::new();
        let bytes_read = reader.read_to_end(&mut buffer)?;
        security.check_input_size(bytes_read as u64)?;

        let sheets = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        match sheets {
            Sheets::Xlsx(workbook) => Ok(Self { workbook }),
            _ => Err(CashIifError::InputFormat(
                "Only XLSX format is supported".to_string(),
            )),
        }
    }
}

impl<R: Read + Seek> WorkbookParser<R> {
    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// シート選択方式に基づいてシート名を決定
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 選択されたシート名
    /// * `Err(CashIifError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    /// * `Err(CashIifError::InputFormat)` - ワークブックにシートが1つもない場合
    pub fn select_sheet(&self, selector: &SheetSelector) -> Result<String, CashIifError> {
        let all_sheet_names = self.sheet_names();

        match selector {
            SheetSelector::First => all_sheet_names.into_iter().next().ok_or_else(|| {
                CashIifError::InputFormat("Workbook contains no sheets".to_string())
            }),

            SheetSelector::Index(index) => {
                all_sheet_names.get(*index).cloned().ok_or_else(|| {
                    CashIifError::Config(format!(
                        "Sheet index {} is out of range (total: {})",
                        index,
                        all_sheet_names.len()
                    ))
                })
            }

            SheetSelector::Name(name) => {
                if !all_sheet_names.contains(name) {
                    return Err(CashIifError::Config(format!("Sheet '{}' not found", name)));
                }
                Ok(name.clone())
            }
        }
    }

    /// シートを読み込み、先頭`skip_rows`行を除いた`RawTable`を生成する
    ///
    /// calamineの範囲は最初の使用セルから始まるため、シート上の絶対座標に
    /// 合わせて先頭の空行・空列を補います。すべての行は同じ幅になります。
    ///
    /// セルを展開する前に、シートが宣言する寸法（`<dimension>`）で行数を検証します。
    /// 寸法の宣言は省略・詐称され得るため、展開後の範囲でも再度検証します。
    pub fn read_table(
        &mut self,
        sheet_name: &str,
        skip_rows: u32,
        security: &SecurityConfig,
    ) -> Result<RawTable, CashIifError> {
        let declared = self
            .workbook
            .worksheet_cells_reader(sheet_name)
            .map_err(|e| CashIifError::Parse(e.into()))?
            .dimensions();
        let declared_rows = declared.end.0.saturating_sub(declared.start.0) as usize + 1;
        security.check_row_count(declared_rows)?;

        let range = self
            .workbook
            .worksheet_range(sheet_name)
            .map_err(|e| CashIifError::Parse(e.into()))?;

        security.check_row_count(range.height())?;

        let table = range_to_table(&range, skip_rows);
        log::debug!(
            "Read {} rows x {} columns from sheet '{}' (skipped {} leading rows)",
            table.len(),
            table.width(),
            sheet_name,
            skip_rows
        );
        Ok(table)
    }
}

/// calamineの範囲を、シートの絶対座標に揃えた`RawTable`に変換する
fn range_to_table(range: &Range<Data>, skip_rows: u32) -> RawTable {
    let (start_row, start_col) = match range.start() {
        Some(start) => start,
        None => return RawTable::default(),
    };
    let width = start_col as usize + range.width();

    let mut rows = Vec::new();

    // 範囲より上にある空行（読み飛ばし行より下のもののみ）
    for _ in skip_rows..start_row {
        rows.push(vec![CellValue::Empty; width]);
    }

    for (offset, row) in range.rows().enumerate() {
        let row_idx = start_row + offset as u32;
        if row_idx < skip_rows {
            continue;
        }

        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }

    RawTable::new(rows)
}

/// calamineのセル値をタグ付きの`CellValue`に変換する
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                return CellValue::Number(dt.as_f64());
            }
            dt.as_datetime()
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::Number(dt.as_f64()))
        }
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}

/// ISO 8601形式の日時（または日付のみ）を解析する
fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    s.parse::<NaiveDateTime>().ok().or_else(|| {
        s.parse::<NaiveDate>()
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cell_scalars() {
        assert_eq!(convert_cell(&Data::Int(4)), CellValue::Number(4.0));
        assert_eq!(convert_cell(&Data::Float(1.5)), CellValue::Number(1.5));
        assert_eq!(
            convert_cell(&Data::String("1023".to_string())),
            CellValue::text("1023")
        );
        assert_eq!(convert_cell(&Data::Bool(true)), CellValue::text("True"));
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_convert_cell_iso_datetime() {
        let expected = NaiveDate::from_ymd_opt(2025, 7, 31)
            .unwrap()
            .and_hms_opt(10, 24, 49)
            .unwrap();
        assert_eq!(
            convert_cell(&Data::DateTimeIso("2025-07-31T10:24:49".to_string())),
            CellValue::DateTime(expected)
        );
        assert_eq!(
            convert_cell(&Data::DateTimeIso("not-a-date".to_string())),
            CellValue::text("not-a-date")
        );
    }

    #[test]
    fn test_range_to_table_aligns_absolute_coordinates() {
        // 範囲はB19から始まる（0始まりで行18、列1）
        let mut range: Range<Data> = Range::new((18, 1), (19, 2));
        range.set_value((18, 1), Data::String("a".to_string()));
        range.set_value((19, 2), Data::Float(2.0));

        let table = range_to_table(&range, 16);

        // 行16, 17は空行、行18, 19がデータ
        assert_eq!(table.len(), 4);
        assert_eq!(table.width(), 3);
        assert!(table.row(0).unwrap().iter().all(|cell| *cell == CellValue::Empty));
        assert_eq!(
            table.row(2).unwrap(),
            &[CellValue::Empty, CellValue::text("a"), CellValue::Empty]
        );
        assert_eq!(table.row(3).unwrap()[2], CellValue::Number(2.0));
    }

    #[test]
    fn test_range_to_table_skips_leading_rows() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 0));
        for row in 0..4u32 {
            range.set_value((row, 0), Data::Int(row as i64));
        }

        let table = range_to_table(&range, 2);
        assert_eq!(table.len(), 2);
        assert_eq!(table.row(0).unwrap()[0], CellValue::Number(2.0));
    }

    #[test]
    fn test_range_to_table_empty_range() {
        let range: Range<Data> = Range::empty();
        assert!(range_to_table(&range, 16).is_empty());
    }
}

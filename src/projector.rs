//! Column Projector Module
//!
//! 固定の列位置から4つの意味フィールドを取り出し、それ以外の列を捨てるモジュール。

use crate::api::{ColumnMapping, Field};
use crate::error::CashIifError;
use crate::types::{CellValue, DropReason, DroppedRow, ProjectedRow, RawTable};

/// 列射影の結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    /// 射影できた行（元の行順を保持）
    pub rows: Vec<ProjectedRow>,

    /// 幅が足りず射影できなかった行
    pub dropped: Vec<DroppedRow>,
}

/// 列プロジェクター
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnProjector {
    mapping: ColumnMapping,
}

impl ColumnProjector {
    pub fn new(mapping: ColumnMapping) -> Self {
        Self { mapping }
    }

    /// テーブルの各行を4フィールドに射影する
    ///
    /// 必要な列位置に届かない行は除外されます。入力に行があるにもかかわらず
    /// 1行も射影できなかった場合は、バッチ全体の失敗として扱います。
    ///
    /// # 戻り値
    ///
    /// * `Ok(Projection)` - 射影結果（空のテーブルに対しては空の結果）
    /// * `Err(CashIifError::InputFormat)` - すべての行が必要な列位置に届かない場合
    pub fn project(&self, table: &RawTable) -> Result<Projection, CashIifError> {
        let mut projection = Projection::default();

        for (index, row) in table.rows().iter().enumerate() {
            match self.project_row(index, row) {
                Ok(projected) => projection.rows.push(projected),
                Err(reason) => {
                    log::warn!("Row {} dropped: {}", index, reason);
                    projection.dropped.push(DroppedRow::new(index, reason));
                }
            }
        }

        if !table.is_empty() && projection.rows.is_empty() {
            return Err(CashIifError::InputFormat(format!(
                "None of the {} rows reaches column {} (widest row has {} columns)",
                table.len(),
                self.mapping.max_index(),
                table.width()
            )));
        }

        log::debug!(
            "Projected {} of {} rows",
            projection.rows.len(),
            table.len()
        );
        Ok(projection)
    }

    fn project_row(&self, index: usize, row: &[CellValue]) -> Result<ProjectedRow, DropReason> {
        let cell = |field: Field| -> Result<CellValue, DropReason> {
            let column = self.mapping.index(field);
            row.get(column)
                .cloned()
                .ok_or(DropReason::ColumnOutOfRange {
                    field,
                    column,
                    width: row.len(),
                })
        };

        Ok(ProjectedRow {
            source_row: index,
            till_number: cell(Field::TillNumber)?,
            sale_date: cell(Field::SaleDate)?,
            bill_number: cell(Field::BillNumber)?,
            amount: cell(Field::Amount)?,
        })
    }
}

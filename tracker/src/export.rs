use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;
use tracing::info;

use crate::aggregate::Aggregation;

pub const SHEET_NAME: &str = "생산현황";
pub const DEFAULT_FILE_NAME: &str = "생산현황.xlsx";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("선택된 품목이 없습니다.")]
    NothingSelected,

    #[error("엑셀 파일 저장 실패: {0}")]
    Write(#[from] XlsxError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub name: String,
    pub count_2024: u32,
    pub monthly_2025: [u32; 12],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub rows: Vec<SheetRow>,
}

impl Sheet {
    /// Collects the selected names that have counts, in selection order.
    pub fn build<'a>(
        selection: impl IntoIterator<Item = &'a str>,
        aggregation: &Aggregation,
    ) -> Result<Self, ExportError> {
        let mut selection = selection.into_iter().peekable();

        if selection.peek().is_none() {
            return Err(ExportError::NothingSelected);
        }

        let rows = selection
            .filter_map(|name| {
                aggregation.get(name).map(|counts| SheetRow {
                    name: name.to_string(),
                    count_2024: counts.count_2024,
                    monthly_2025: counts.monthly_2025,
                })
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn header() -> Vec<String> {
        ["품목명".to_string(), "2024년 생산 횟수".to_string()]
            .into_iter()
            .chain((1..=12).map(|month| format!("2025년 {month}월")))
            .collect()
    }

    pub fn write(&self, path: &Path) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, title) in Self::header().iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, title, &bold)?;
        }

        for (i, row) in self.rows.iter().enumerate() {
            let line = i as u32 + 1;

            worksheet.write_string(line, 0, &row.name)?;
            worksheet.write_number(line, 1, row.count_2024)?;

            for (month, &count) in row.monthly_2025.iter().enumerate() {
                worksheet.write_number(line, month as u16 + 2, count)?;
            }
        }

        worksheet.set_column_width(0, 24)?;
        workbook.save(path)?;

        info!(path = %path.display(), rows = self.rows.len(), "Exported workbook");

        Ok(())
    }
}

use anyhow::{Context, Result};
use log::debug;
use rust_xlsxwriter::{Format, FormatBorder, Workbook};
use std::path::Path;

use crate::survey::table::{Cell, Table};

pub const SHEET_NAME: &str = "Sheet 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Whole sheet held in memory until save
    Standard,
    /// Rows are flushed as they are written; for the answers table
    ConstantMemory,
}

/// Write `table` as a single-sheet workbook: header row, then one row per record.
pub fn write_table(table: &Table, path: &Path, mode: WriteMode) -> Result<()> {
    debug!("Writing {} rows of {} to {:?} ({:?})", table.len(), table.name, path, mode);

    let mut workbook = Workbook::new();
    let worksheet = match mode {
        WriteMode::Standard => workbook.add_worksheet(),
        WriteMode::ConstantMemory => {
            workbook.use_zip_large_file(true);
            workbook.add_worksheet_with_constant_memory()
        }
    };
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);
    for (col, name) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let row_num = idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(value) => {
                    worksheet.write_string(row_num, col as u16, value)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row_num, col as u16, *value)?;
                }
                Cell::Empty => {}
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    Ok(())
}

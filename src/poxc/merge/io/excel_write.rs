use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use crate::poxc::merge::error::{MergeError, Result};
use crate::poxc::merge::model::{Cell, Dataset};

/// Name of the single worksheet holding the consolidated rows.
pub const OUTPUT_SHEET: &str = "merged";

/// Writes the dataset to a single-sheet workbook at `path`.
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let worksheet = workbook_writer.add_worksheet();
    worksheet.set_name(OUTPUT_SHEET)?;

    let header_format = Format::new().set_bold();
    for (col_idx, header) in dataset.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, column_number(col_idx)?, header, &header_format)?;
    }

    for (row_idx, record) in dataset.records.iter().enumerate() {
        let row = row_number(row_idx + 1)?;
        for (col_idx, cell) in record.cells.iter().enumerate() {
            let col = column_number(col_idx)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(value) => {
                    worksheet.write_string(row, col, value)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row, col, *value)?;
                }
                Cell::Bool(value) => {
                    worksheet.write_boolean(row, col, *value)?;
                }
            }
        }
    }

    if !dataset.columns.is_empty() {
        let col_end = column_number(dataset.columns.len() - 1)?;
        worksheet.autofilter(0, 0, row_number(dataset.records.len())?, col_end)?;
        worksheet.set_freeze_panes(1, 0)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn column_number(idx: usize) -> Result<u16> {
    u16::try_from(idx).map_err(|_| {
        MergeError::InvalidWorkbook(format!("column {idx} is beyond the worksheet width"))
    })
}

fn row_number(idx: usize) -> Result<u32> {
    u32::try_from(idx).map_err(|_| {
        MergeError::InvalidWorkbook(format!("row {idx} is beyond the worksheet height"))
    })
}

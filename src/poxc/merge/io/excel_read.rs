use std::collections::HashSet;
use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use chrono::{Duration, NaiveDate, NaiveTime};

use crate::poxc::merge::error::{MergeError, Result};
use crate::poxc::merge::model::{Cell, Table};

/// Reads the first worksheet of the workbook at `path`.
pub fn read_first_sheet(path: &Path) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            MergeError::InvalidWorkbook(format!("{} has no worksheets", path.display()))
        })?
        .map_err(MergeError::from)?;
    Ok(range_to_table(&range))
}

/// Reads the worksheet called `sheet` from the workbook at `path`.
pub fn read_sheet(path: &Path, sheet: &str) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range(sheet)
        .ok_or_else(|| MergeError::MissingSheet {
            file: path.to_path_buf(),
            sheet: sheet.to_string(),
        })?
        .map_err(MergeError::from)?;
    Ok(range_to_table(&range))
}

fn range_to_table(range: &Range<DataType>) -> Table {
    let mut rows = range.rows();
    let columns = match rows.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                let name = convert_cell(cell).to_string();
                let name = name.trim();
                if name.is_empty() {
                    format!("Unnamed: {idx}")
                } else {
                    name.to_string()
                }
            })
            .collect(),
        None => return Table::default(),
    };
    let columns = dedup_headers(columns);

    let width = columns.len();
    let rows = rows
        .map(|row| {
            let mut cells: Vec<Cell> = row.iter().take(width).map(convert_cell).collect();
            cells.resize(width, Cell::Empty);
            cells
        })
        .filter(|cells| !cells.iter().all(Cell::is_empty))
        .collect();

    Table { columns, rows }
}

/// Repeated header names get a `.1`, `.2`, ... suffix so that no column is
/// shadowed when rows are later addressed by name.
fn dedup_headers(columns: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(columns.len());
    for column in columns {
        let mut candidate = column.clone();
        let mut counter = 1;
        while !seen.insert(candidate.to_lowercase()) {
            candidate = format!("{column}.{counter}");
            counter += 1;
        }
        unique.push(candidate);
    }
    unique
}

fn convert_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::String(value) => Cell::Text(value.clone()),
        DataType::Float(value) => Cell::Number(*value),
        DataType::Int(value) => Cell::Number(*value as f64),
        DataType::Bool(value) => Cell::Bool(*value),
        DataType::DateTime(serial) => {
            serial_to_text(*serial).map_or(Cell::Number(*serial), Cell::Text)
        }
        DataType::Empty => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

/// Converts an Excel serial date (days since 1899-12-30) to ISO-8601 text.
fn serial_to_text(serial: f64) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }
    let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(midnight);
    let millis = (serial * 86_400_000.0).round() as i64;
    let timestamp = epoch.checked_add_signed(Duration::milliseconds(millis))?;
    if timestamp.time() == midnight {
        Some(timestamp.format("%Y-%m-%d").to_string())
    } else {
        Some(timestamp.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{dedup_headers, serial_to_text};

    #[test]
    fn serial_dates_render_as_iso_text() {
        assert_eq!(serial_to_text(45292.0).as_deref(), Some("2024-01-01"));
        assert_eq!(serial_to_text(45292.5).as_deref(), Some("2024-01-01T12:00:00"));
    }

    #[test]
    fn repeated_headers_are_suffixed() {
        let headers = vec!["plot".to_string(), "poxc".to_string(), "POXC".to_string()];
        assert_eq!(dedup_headers(headers), vec!["plot", "poxc", "POXC.1"]);
    }
}

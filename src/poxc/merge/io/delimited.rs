use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::poxc::merge::error::Result;
use crate::poxc::merge::model::{Cell, Dataset, Table};

/// Writes the dataset as comma-separated text with a header row. Empty cells
/// become empty fields.
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
    writer.write_record(&dataset.columns)?;
    for record in &dataset.records {
        writer.write_record(record.cells.iter().map(Cell::to_string))?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a comma-separated file back into a [`Table`]. Every non-empty field
/// is returned as text; empty fields become [`Cell::Empty`].
pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let columns = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cells = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        rows.push(cells);
    }

    Ok(Table { columns, rows })
}

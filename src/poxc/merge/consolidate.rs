use std::collections::HashMap;
use std::path::Path;

use tracing::{info, instrument};

use crate::poxc::merge::error::{MergeError, Result};
use crate::poxc::merge::model::{Cell, Dataset, MergedRecord, MergedTable};

/// Concatenates the merged tables in the order given and sorts the result by
/// plot text. The sort is stable, so rows sharing a plot keep file order and
/// then within-file order.
///
/// The column set is the union of every table's columns in order of first
/// appearance. Cells a table does not have are left empty. `data_dir` only
/// feeds the error raised when `tables` is empty.
#[instrument(level = "info", skip_all, fields(tables = tables.len()))]
pub fn consolidate(tables: Vec<MergedTable>, data_dir: &Path) -> Result<Dataset> {
    if tables.is_empty() {
        return Err(MergeError::NoSourcesMerged(data_dir.to_path_buf()));
    }

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for table in &tables {
        for column in &table.columns {
            if !positions.contains_key(column) {
                positions.insert(column.clone(), columns.len());
                columns.push(column.clone());
            }
        }
    }

    let mut records = Vec::with_capacity(tables.iter().map(|table| table.records.len()).sum());
    for table in tables {
        let mapping: Vec<usize> = table
            .columns
            .iter()
            .map(|column| positions[column])
            .collect();
        for record in table.records {
            let mut cells = vec![Cell::Empty; columns.len()];
            for (cell, target) in record.cells.into_iter().zip(&mapping) {
                cells[*target] = cell;
            }
            records.push(MergedRecord {
                key: record.key,
                cells,
            });
        }
    }

    records.sort_by(|lhs, rhs| lhs.key.plot.cmp(&rhs.key.plot));
    info!(rows = records.len(), columns = columns.len(), "consolidated dataset");

    Ok(Dataset { columns, records })
}

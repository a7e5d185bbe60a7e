use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, instrument};

use crate::poxc::merge::error::{MergeError, Result};
use crate::poxc::merge::io::excel_read;
use crate::poxc::merge::keys::KeyTable;
use crate::poxc::merge::model::{
    Cell, CompositeKey, DEPTH_COLUMN, MergedRecord, MergedTable, PLOT_COLUMN, SOURCE_SHEET_COLUMN,
    Table,
};

/// Reads `data_tab` from the workbook at `path` and left-joins it against the
/// key table.
#[instrument(level = "info", skip(path, keys), fields(path = %path.display()))]
pub fn load_and_merge(path: &Path, data_tab: &str, keys: &KeyTable) -> Result<MergedTable> {
    let table = excel_read::read_sheet(path, data_tab)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    merge_source(&file_name, table, keys, path)
}

/// Left-joins one source sheet against the key table on (plot, depth).
///
/// Every source row is kept. A row whose key matches `n` key rows yields `n`
/// merged rows; a row without a match yields one row with the key-table
/// columns left empty. `path` is only used in error messages.
pub fn merge_source(
    file_name: &str,
    table: Table,
    keys: &KeyTable,
    path: &Path,
) -> Result<MergedTable> {
    let require = |name: &str| {
        table.position(name).ok_or_else(|| MergeError::MissingColumn {
            file: path.to_path_buf(),
            column: name.to_string(),
        })
    };
    let plot_idx = require(PLOT_COLUMN)?;
    let depth_idx = require(DEPTH_COLUMN)?;
    let sheet_idx = table.position(SOURCE_SHEET_COLUMN);

    let layout = ColumnLayout::new(&table.columns, plot_idx, depth_idx, sheet_idx, keys)
        .map_err(|column| {
            MergeError::InvalidWorkbook(format!(
                "{}: column '{column}' appears twice after joining with the key table",
                path.display()
            ))
        })?;

    let mut records = Vec::with_capacity(table.rows.len());
    for mut row in table.rows {
        let key = CompositeKey::from_cells(&row[plot_idx], &row[depth_idx]);
        row[plot_idx] = Cell::from_key_text(&key.plot);
        row[depth_idx] = Cell::from_key_text(&key.depth);
        let source = Cell::Text(file_name.to_string());
        match sheet_idx {
            Some(idx) => row[idx] = source,
            None => row.push(source),
        }

        let mut matched = false;
        if !key.is_blank() {
            for key_record in keys.matches(&key) {
                matched = true;
                let mut cells = Vec::with_capacity(layout.columns.len());
                cells.extend(row.iter().cloned());
                cells.extend(key_record.values.iter().cloned());
                records.push(MergedRecord {
                    key: key.clone(),
                    cells,
                });
            }
        }
        if !matched {
            row.resize(layout.columns.len(), Cell::Empty);
            records.push(MergedRecord { key, cells: row });
        }
    }

    debug!(
        file = file_name,
        rows = records.len(),
        columns = layout.columns.len(),
        "merged source sheet"
    );

    Ok(MergedTable {
        source: file_name.to_string(),
        columns: layout.columns,
        records,
    })
}

/// Output column names of a merge: source columns, `source sheet`, then the
/// key table's treatment columns. Names present on both sides are suffixed
/// `_x` (source) and `_y` (key table). `source sheet` always holds the file
/// name, so a key-table column of that name becomes `source sheet_y`.
struct ColumnLayout {
    columns: Vec<String>,
}

impl ColumnLayout {
    /// Fails with the first repeated name if the layout is not unique.
    fn new(
        source: &[String],
        plot_idx: usize,
        depth_idx: usize,
        sheet_idx: Option<usize>,
        keys: &KeyTable,
    ) -> std::result::Result<Self, String> {
        let clashes = |name: &str| keys.columns.iter().any(|column| column == name);

        let mut columns = Vec::with_capacity(source.len() + keys.columns.len() + 1);
        for (idx, name) in source.iter().enumerate() {
            let name = if idx == plot_idx {
                PLOT_COLUMN.to_string()
            } else if idx == depth_idx {
                DEPTH_COLUMN.to_string()
            } else if Some(idx) == sheet_idx {
                SOURCE_SHEET_COLUMN.to_string()
            } else if clashes(name) {
                format!("{name}_x")
            } else {
                name.clone()
            };
            columns.push(name);
        }
        if sheet_idx.is_none() {
            columns.push(SOURCE_SHEET_COLUMN.to_string());
        }

        for column in &keys.columns {
            let clashes_source = column == SOURCE_SHEET_COLUMN
                || source.iter().enumerate().any(|(idx, name)| {
                    idx != plot_idx && idx != depth_idx && Some(idx) != sheet_idx && name == column
                });
            if clashes_source {
                columns.push(format!("{column}_y"));
            } else {
                columns.push(column.clone());
            }
        }

        let mut seen = HashSet::with_capacity(columns.len());
        if let Some(repeated) = columns.iter().find(|column| !seen.insert(column.as_str())) {
            return Err(repeated.clone());
        }
        Ok(Self { columns })
    }
}

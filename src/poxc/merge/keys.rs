use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::poxc::merge::config::KeyPolicy;
use crate::poxc::merge::error::{MergeError, Result};
use crate::poxc::merge::io::excel_read;
use crate::poxc::merge::model::{Cell, CompositeKey, DEPTH_COLUMN, PLOT_COLUMN, Table};
use crate::poxc::merge::validate::{DuplicateKey, find_duplicates};

/// One row of the key table: its composite key plus the treatment columns.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRecord {
    pub key: CompositeKey,
    /// Aligned with [`KeyTable::columns`].
    pub values: Vec<Cell>,
}

/// The authoritative (plot, depth) → treatment mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyTable {
    /// Lowercased names of every column other than `plot` and `depth`.
    pub columns: Vec<String>,
    pub records: Vec<KeyRecord>,
    index: HashMap<CompositeKey, Vec<usize>>,
}

impl KeyTable {
    /// Loads the first worksheet of the key workbook and applies `policy` to
    /// repeated keys.
    #[instrument(
        level = "info",
        skip_all,
        fields(path = %path.display(), policy = ?policy)
    )]
    pub fn load(path: &Path, policy: KeyPolicy) -> Result<Self> {
        if !path.is_file() {
            return Err(MergeError::MissingKeyTable(path.to_path_buf()));
        }
        let table = excel_read::read_first_sheet(path)?;
        let keys = Self::from_table(table, path)?;
        info!(
            rows = keys.records.len(),
            columns = keys.columns.len(),
            "loaded key table"
        );

        let duplicates = keys.duplicate_keys();
        if !duplicates.is_empty() {
            let listed = duplicates
                .iter()
                .map(|duplicate| format!("{} x{}", duplicate.key, duplicate.occurrences))
                .collect::<Vec<_>>()
                .join(", ");
            match policy {
                KeyPolicy::FanOut => {
                    warn!(keys = %listed, "key table repeats keys; matching rows will fan out");
                }
                KeyPolicy::Reject => return Err(MergeError::DuplicateKeyTableEntries(listed)),
            }
        }
        Ok(keys)
    }

    /// Builds the key table from a raw sheet. Column names are lowercased and
    /// rows with neither a plot nor a depth are dropped.
    pub fn from_table(table: Table, source: &Path) -> Result<Self> {
        let columns: Vec<String> = table
            .columns
            .iter()
            .map(|column| column.trim().to_lowercase())
            .collect();
        let locate = |name: &str| {
            columns
                .iter()
                .position(|column| column == name)
                .ok_or_else(|| MergeError::MissingColumn {
                    file: source.to_path_buf(),
                    column: name.to_string(),
                })
        };
        let plot_idx = locate(PLOT_COLUMN)?;
        let depth_idx = locate(DEPTH_COLUMN)?;

        let value_columns: Vec<usize> = (0..columns.len())
            .filter(|idx| *idx != plot_idx && *idx != depth_idx)
            .collect();

        let mut records = Vec::with_capacity(table.rows.len());
        let mut index: HashMap<CompositeKey, Vec<usize>> = HashMap::new();
        for row in table.rows {
            let key = CompositeKey::from_cells(&row[plot_idx], &row[depth_idx]);
            if key.is_blank() {
                debug!("skipping key row without plot or depth");
                continue;
            }
            let values = value_columns.iter().map(|idx| row[*idx].clone()).collect();
            index.entry(key.clone()).or_default().push(records.len());
            records.push(KeyRecord { key, values });
        }

        Ok(Self {
            columns: value_columns
                .into_iter()
                .map(|idx| columns[idx].clone())
                .collect(),
            records,
            index,
        })
    }

    /// Every key row whose pair equals `key`, in key-table order.
    pub fn matches<'a>(&'a self, key: &CompositeKey) -> impl Iterator<Item = &'a KeyRecord> {
        self.index
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|idx| &self.records[*idx])
    }

    pub fn keys(&self) -> impl Iterator<Item = &CompositeKey> {
        self.records.iter().map(|record| &record.key)
    }

    /// Pairs occurring on more than one key row.
    pub fn duplicate_keys(&self) -> Vec<DuplicateKey> {
        find_duplicates(self.keys())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Cell {
        Cell::Text(value.to_string())
    }

    #[test]
    fn column_names_are_lowercased_and_numeric_plots_normalised() {
        let table = Table {
            columns: vec!["Plot".into(), "DEPTH".into(), "Treatment".into()],
            rows: vec![
                vec![Cell::Number(1.0), text("0-10"), text("A")],
                vec![Cell::Empty, Cell::Empty, text("orphan")],
            ],
        };

        let keys = KeyTable::from_table(table, Path::new("key.xlsx")).expect("key table built");

        assert_eq!(keys.columns, vec!["treatment".to_string()]);
        assert_eq!(keys.len(), 1);
        let matched: Vec<_> = keys.matches(&CompositeKey::new("1", "0-10")).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].values, vec![text("A")]);
    }

    #[test]
    fn missing_depth_column_is_reported() {
        let table = Table {
            columns: vec!["plot".into(), "treatment".into()],
            rows: Vec::new(),
        };

        let error = KeyTable::from_table(table, Path::new("key.xlsx")).unwrap_err();
        assert!(matches!(error, MergeError::MissingColumn { ref column, .. } if column == "depth"));
    }
}

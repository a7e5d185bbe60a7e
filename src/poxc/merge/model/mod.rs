use std::fmt;

use serde::Serialize;

/// Name of the column every merged row carries to record its originating file.
pub const SOURCE_SHEET_COLUMN: &str = "source sheet";
/// Join column holding the plot identifier.
pub const PLOT_COLUMN: &str = "plot";
/// Join column holding the sampling depth.
pub const DEPTH_COLUMN: &str = "depth";

/// A single spreadsheet value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// Blank cell, or a key-table column without a matching key row.
    #[default]
    Empty,
    /// Text literal. Spreadsheet dates are stored here in ISO-8601 form.
    Text(String),
    /// Numeric literal. Integer cells are widened to `f64`.
    Number(f64),
    /// Boolean literal.
    Bool(bool),
}

impl Cell {
    /// Returns `true` when the cell holds no value.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }

    /// Wraps normalised key text, mapping an empty part back to an empty cell.
    pub fn from_key_text(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }

    /// Renders the cell as the text form used for join keys. Integral numbers
    /// lose their fractional part so that `1.0` and `"1"` join.
    pub fn key_text(&self) -> String {
        match self {
            Cell::Text(value) => value.trim().to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(value) => f.write_str(value),
            Cell::Number(value) => f.write_str(&format_number(*value)),
            Cell::Bool(value) => write!(f, "{value}"),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// The (plot, depth) pair that identifies a sampling location and depth.
///
/// Both parts are normalised to text once, when a row is ingested, so every
/// comparison afterwards is a plain string comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CompositeKey {
    pub plot: String,
    pub depth: String,
}

impl CompositeKey {
    pub fn new(plot: impl Into<String>, depth: impl Into<String>) -> Self {
        Self {
            plot: plot.into(),
            depth: depth.into(),
        }
    }

    /// Builds the key from the raw plot and depth cells of a row.
    pub fn from_cells(plot: &Cell, depth: &Cell) -> Self {
        Self::new(plot.key_text(), depth.key_text())
    }

    /// Returns `true` when neither part carries a value. Blank keys never join.
    pub fn is_blank(&self) -> bool {
        self.plot.is_empty() && self.depth.is_empty()
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.plot, self.depth)
    }
}

/// A rectangular sheet as read from a workbook: one header row followed by
/// data rows. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Looks up a column by name, ignoring ASCII case and surrounding whitespace.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.trim().eq_ignore_ascii_case(name))
    }
}

/// One row of a merge result, aligned with the columns of its owning
/// [`MergedTable`] or [`Dataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub key: CompositeKey,
    pub cells: Vec<Cell>,
}

/// The left join of one source file against the key table.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    /// File name of the source workbook.
    pub source: String,
    pub columns: Vec<String>,
    pub records: Vec<MergedRecord>,
}

/// All merged records of a run, sorted by plot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<MergedRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of the column with exactly this name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Cell of row `row` in column `name`, if both exist.
    pub fn value(&self, row: usize, name: &str) -> Option<&Cell> {
        let column = self.column(name)?;
        self.records.get(row)?.cells.get(column)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CompositeKey> {
        self.records.iter().map(|record| &record.key)
    }
}

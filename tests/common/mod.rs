#![allow(dead_code)]

use std::path::{Path, PathBuf};

use poxc_merge::config::{Config, DEFAULT_DATA_TAB, DEFAULT_KEY_FILE};
use poxc_merge::model::Cell;
use rust_xlsxwriter::Workbook;

pub fn text(value: &str) -> Cell {
    Cell::Text(value.to_string())
}

pub fn num(value: f64) -> Cell {
    Cell::Number(value)
}

/// Writes a workbook with a single sheet called `sheet`.
pub fn write_workbook(path: &Path, sheet: &str, headers: &[&str], rows: &[Vec<Cell>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).expect("sheet named");
    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .expect("header written");
    }
    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(value) => {
                    worksheet.write_string(row_num, col, value).expect("cell written");
                }
                Cell::Number(value) => {
                    worksheet.write_number(row_num, col, *value).expect("cell written");
                }
                Cell::Bool(value) => {
                    worksheet.write_boolean(row_num, col, *value).expect("cell written");
                }
            }
        }
    }
    workbook.save(path).expect("workbook saved");
}

/// Key workbook with mixed-case headers, as typed by hand in the field.
pub fn write_key_table(data_dir: &Path, rows: &[Vec<Cell>]) -> PathBuf {
    let path = data_dir.join(DEFAULT_KEY_FILE);
    write_workbook(&path, "Sheet1", &["Plot", "Depth", "Treatment"], rows);
    path
}

/// Source workbook carrying the default data tab.
pub fn write_source(data_dir: &Path, name: &str, rows: &[Vec<Cell>]) -> PathBuf {
    let path = data_dir.join(name);
    write_workbook(&path, DEFAULT_DATA_TAB, &["plot", "depth", "poxc"], rows);
    path
}

pub fn config_for(data_dir: &Path, output_dir: &Path) -> Config {
    Config {
        data_dir: data_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        ..Config::default()
    }
}

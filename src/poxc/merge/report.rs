//! Console text shown to the operator. Everything here returns strings so the
//! binary decides where they go.

use std::fmt::Write as _;
use std::path::PathBuf;

use colored::Colorize;

use crate::poxc::merge::pipeline::FileOutcome;
use crate::poxc::merge::validate::ValidationReport;

/// Section heading: the title centred in a 30 character rule of dashes.
pub fn banner(title: &str) -> String {
    format!("{title:-^30}")
}

/// One line per source workbook.
pub fn file_notice(outcome: &FileOutcome) -> String {
    match outcome {
        FileOutcome::Merged { file, rows } => {
            format!("> Successfully handled {file} ({rows} rows)")
        }
        FileOutcome::Skipped { file, reason } => {
            format!("> {} Error with {file}: {reason}", "Warning!".yellow().bold())
        }
    }
}

/// Completion notice listing every file written.
pub fn done_notice(written: &[PathBuf]) -> String {
    let mut text = format!("\n{}\n", "Done!".green().bold());
    for path in written {
        let _ = writeln!(text, "> Saved result to file '{}'", path.display());
    }
    text
}

/// Missing and duplicated keys as pipe tables. Each table is present only
/// when it has rows; a clean report renders the heading alone.
pub fn validation_section(report: &ValidationReport) -> String {
    let mut text = format!("\n{}\n", banner("CHECKING DATA"));
    if report.is_clean() {
        return text;
    }

    if !report.missing_keys.is_empty() {
        let rows: Vec<Vec<String>> = report
            .missing_keys
            .iter()
            .map(|key| vec![key.plot.clone(), key.depth.clone()])
            .collect();
        text.push_str("\nYou do not have data for every key. Missing keys:\n\n");
        text.push_str(&pipe_table(&["plot", "depth"], &rows));
    }

    if !report.duplicate_keys.is_empty() {
        let rows: Vec<Vec<String>> = report
            .duplicate_keys
            .iter()
            .map(|duplicate| {
                vec![
                    duplicate.key.plot.clone(),
                    duplicate.key.depth.clone(),
                    duplicate.occurrences.to_string(),
                ]
            })
            .collect();
        text.push_str("\nYou have some duplicated keys in your data. Duplicates:\n\n");
        text.push_str(&pipe_table(&["plot", "depth", "rows"], &rows));
    }

    text
}

/// Renders a Markdown pipe table with left-aligned, padded columns.
pub fn pipe_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut text = String::new();
    let header_cells: Vec<String> = headers.iter().map(|header| header.to_string()).collect();
    push_row(&mut text, &header_cells, &widths);

    text.push('|');
    for width in &widths {
        let _ = write!(text, ":{}|", "-".repeat(width + 1));
    }
    text.push('\n');

    for row in rows {
        push_row(&mut text, row, &widths);
    }
    text
}

fn push_row(text: &mut String, cells: &[String], widths: &[usize]) {
    text.push('|');
    for (idx, &width) in widths.iter().enumerate() {
        let cell = cells.get(idx).map(String::as_str).unwrap_or_default();
        let _ = write!(text, " {cell:<width$} |");
    }
    text.push('\n');
}

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::poxc::merge::config::OutputFormat;
use crate::poxc::merge::error::Result;
use crate::poxc::merge::io::{delimited, excel_write};
use crate::poxc::merge::model::Dataset;

/// File name for a run on `date`, e.g. `output_03-07-2024.csv`.
pub fn output_file_name(date: NaiveDate, format: OutputFormat) -> String {
    format!("output_{}.{}", date.format("%m-%d-%Y"), format.extension())
}

/// Creates `output_dir` when absent and writes one file per requested format.
/// Existing files for the same date are overwritten.
#[instrument(
    level = "info",
    skip_all,
    fields(output_dir = %output_dir.display(), date = %date)
)]
pub fn write_outputs(
    dataset: &Dataset,
    output_dir: &Path,
    date: NaiveDate,
    formats: &[OutputFormat],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(formats.len());
    for &format in formats {
        let path = output_dir.join(output_file_name(date, format));
        match format {
            OutputFormat::Xlsx => excel_write::write_dataset(&path, dataset)?,
            OutputFormat::Csv => delimited::write_dataset(&path, dataset)?,
        }
        info!(path = %path.display(), rows = dataset.len(), "wrote output file");
        written.push(path);
    }
    Ok(written)
}

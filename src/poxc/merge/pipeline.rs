use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::poxc::merge::config::Config;
use crate::poxc::merge::consolidate::consolidate;
use crate::poxc::merge::discover;
use crate::poxc::merge::error::Result;
use crate::poxc::merge::io::output;
use crate::poxc::merge::join;
use crate::poxc::merge::keys::KeyTable;
use crate::poxc::merge::model::Dataset;
use crate::poxc::merge::validate::{ValidationReport, validate};

/// Result of trying to merge one source workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Merged { file: String, rows: usize },
    Skipped { file: String, reason: String },
}

impl FileOutcome {
    pub fn file(&self) -> &str {
        match self {
            FileOutcome::Merged { file, .. } | FileOutcome::Skipped { file, .. } => file,
        }
    }
}

/// Per-file outcomes of a run, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files: Vec<FileOutcome>,
}

impl RunSummary {
    pub fn merged(&self) -> usize {
        self.files
            .iter()
            .filter(|outcome| matches!(outcome, FileOutcome::Merged { .. }))
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files
            .iter()
            .filter(|outcome| matches!(outcome, FileOutcome::Skipped { .. }))
    }
}

/// Everything produced before anything is written to disk.
#[derive(Debug, Clone)]
pub struct MergeRun {
    pub summary: RunSummary,
    pub keys: KeyTable,
    pub dataset: Dataset,
    pub report: ValidationReport,
}

/// A completed run, including the files written.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub run: MergeRun,
    pub written: Vec<PathBuf>,
}

/// Loads the key table, merges every source workbook and validates the
/// consolidated rows. `on_file` is called once per source workbook as soon as
/// its outcome is known.
///
/// A workbook that cannot be read or joined is recorded as skipped. The run
/// fails only when the key table cannot be loaded or nothing was merged.
#[instrument(
    level = "info",
    skip_all,
    fields(data_dir = %config.data_dir.display(), key_file = %config.key_file)
)]
pub fn merge_sources<F>(config: &Config, mut on_file: F) -> Result<MergeRun>
where
    F: FnMut(&FileOutcome),
{
    let keys = KeyTable::load(&config.key_path(), config.key_policy)?;
    let files = discover::source_files(&config.data_dir, &config.key_file)?;
    info!(file_count = files.len(), "discovered source workbooks");

    let mut summary = RunSummary::default();
    let mut tables = Vec::with_capacity(files.len());
    for path in files {
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let outcome = match join::load_and_merge(&path, &config.data_tab, &keys) {
            Ok(table) => {
                let rows = table.records.len();
                tables.push(table);
                FileOutcome::Merged { file, rows }
            }
            Err(error) => {
                warn!(file = %file, %error, "skipping source workbook");
                FileOutcome::Skipped {
                    file,
                    reason: error.to_string(),
                }
            }
        };
        on_file(&outcome);
        summary.files.push(outcome);
    }

    let dataset = consolidate(tables, &config.data_dir)?;
    let report = validate(&dataset, &keys);

    Ok(MergeRun {
        summary,
        keys,
        dataset,
        report,
    })
}

/// Runs [`merge_sources`] and writes the consolidated rows in every configured
/// format, naming the files after `date`.
#[instrument(
    level = "info",
    skip_all,
    fields(output_dir = %config.output_dir.display(), date = %date)
)]
pub fn run<F>(config: &Config, date: NaiveDate, on_file: F) -> Result<RunOutput>
where
    F: FnMut(&FileOutcome),
{
    let run = merge_sources(config, on_file)?;
    let written = output::write_outputs(&run.dataset, &config.output_dir, date, &config.formats)?;
    Ok(RunOutput { run, written })
}

#[derive(Serialize)]
struct SummaryDocument<'a> {
    files: &'a [FileOutcome],
    rows: usize,
    validation: &'a ValidationReport,
    written: Vec<String>,
}

/// Writes a JSON document describing the run: per-file outcomes, row count,
/// validation findings and output paths.
pub fn write_summary(path: &Path, run: &MergeRun, written: &[PathBuf]) -> Result<()> {
    let document = SummaryDocument {
        files: &run.summary.files,
        rows: run.dataset.len(),
        validation: &run.report,
        written: written
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
    };
    let json_string = serde_json::to_string_pretty(&document)?;
    fs::write(path, json_string)?;
    Ok(())
}

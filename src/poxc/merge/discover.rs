use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::poxc::merge::error::{MergeError, Result};

/// Lists the source workbooks of `data_dir`: every `.xlsx` file other than the
/// key workbook, sorted by file name ignoring case. Office lock files
/// (`~$...`) are ignored.
pub fn source_files(data_dir: &Path, key_file: &str) -> Result<Vec<PathBuf>> {
    if !data_dir.is_dir() {
        return Err(MergeError::MissingInput(data_dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(data_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let is_workbook = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
        if !is_workbook || name == key_file || name.starts_with("~$") {
            debug!(file = name, "not a source workbook");
            continue;
        }
        files.push(path);
    }

    files.sort_by_cached_key(|path| {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        (name.to_lowercase(), name)
    });
    Ok(files)
}

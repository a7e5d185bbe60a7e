use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::poxc::merge::error::{MergeError, Result};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_KEY_FILE: &str = "POXC_FinalData.xlsx";
pub const DEFAULT_DATA_TAB: &str = "POX-C Calculation";

/// Serialisation written by the output step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}

/// How the key table loader treats repeated (plot, depth) pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyPolicy {
    /// Keep every key row and warn. A source row matching `n` key rows
    /// produces `n` merged rows.
    #[default]
    FanOut,
    /// Refuse to run when the key table repeats a pair.
    Reject,
}

/// Settings for a single run. Built once at startup and passed by reference
/// to every stage; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the key workbook and every source workbook.
    pub data_dir: PathBuf,
    /// Directory receiving the dated output files.
    pub output_dir: PathBuf,
    /// File name of the key workbook inside `data_dir`.
    pub key_file: String,
    /// Tab read from each source workbook.
    pub data_tab: String,
    pub formats: Vec<OutputFormat>,
    pub key_policy: KeyPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            key_file: DEFAULT_KEY_FILE.to_string(),
            data_tab: DEFAULT_DATA_TAB.to_string(),
            formats: vec![OutputFormat::Xlsx, OutputFormat::Csv],
            key_policy: KeyPolicy::FanOut,
        }
    }
}

impl Config {
    /// Full path of the key workbook.
    pub fn key_path(&self) -> PathBuf {
        self.data_dir.join(&self.key_file)
    }
}

/// A partial configuration. Each layer (config file, command line, prompts)
/// produces one of these and [`ConfigOverrides::apply`] folds it over the
/// previous result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub key_file: Option<String>,
    pub data_tab: Option<String>,
    pub formats: Option<Vec<OutputFormat>>,
    pub key_policy: Option<KeyPolicy>,
}

impl ConfigOverrides {
    /// Loads overrides from a JSON document such as
    /// `{"data_dir": "samples", "formats": ["csv"]}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MergeError::MissingInput(path.to_path_buf()));
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Returns `config` with every field set in `self` replaced. An empty
    /// format list leaves the formats untouched.
    pub fn apply(self, config: Config) -> Config {
        let formats = match self.formats {
            Some(formats) if !formats.is_empty() => dedup_formats(formats),
            _ => config.formats,
        };
        Config {
            data_dir: self.data_dir.unwrap_or(config.data_dir),
            output_dir: self.output_dir.unwrap_or(config.output_dir),
            key_file: self.key_file.unwrap_or(config.key_file),
            data_tab: self.data_tab.unwrap_or(config.data_tab),
            formats,
            key_policy: self.key_policy.unwrap_or(config.key_policy),
        }
    }
}

fn dedup_formats(formats: Vec<OutputFormat>) -> Vec<OutputFormat> {
    let mut unique = Vec::with_capacity(formats.len());
    for format in formats {
        if !unique.contains(&format) {
            unique.push(format);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_the_fields_they_set() {
        let overrides: ConfigOverrides =
            serde_json::from_str(r#"{"data_dir": "samples", "formats": ["csv", "csv"]}"#)
                .expect("overrides parsed");
        let config = overrides.apply(Config::default());

        assert_eq!(config.data_dir, PathBuf::from("samples"));
        assert_eq!(config.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(config.key_file, DEFAULT_KEY_FILE);
        assert_eq!(config.formats, vec![OutputFormat::Csv]);
        assert_eq!(config.key_policy, KeyPolicy::FanOut);
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let parsed = serde_json::from_str::<ConfigOverrides>(r#"{"datadir": "x"}"#);
        assert!(parsed.is_err());
    }
}

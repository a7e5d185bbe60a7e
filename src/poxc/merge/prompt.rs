use std::io::{BufRead, Write};
use std::path::PathBuf;

use colored::Colorize;

use crate::poxc::merge::config::{Config, ConfigOverrides};
use crate::poxc::merge::error::Result;
use crate::poxc::merge::report::banner;

/// Asks for the data directory, output directory, key workbook and data tab,
/// showing the current value of each. An empty answer, or end of input,
/// keeps the current value.
pub fn prompt_config<R, W>(config: Config, input: &mut R, output: &mut W) -> Result<Config>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "\n{}", banner("CONFIG"))?;
    writeln!(output, "Press enter to use default values.\n")?;

    let data_dir = ask(
        input,
        output,
        "Path to data directory?",
        &config.data_dir.display().to_string(),
    )?;
    let output_dir = ask(
        input,
        output,
        "Where to output files?",
        &config.output_dir.display().to_string(),
    )?;
    let key_file = ask(input, output, "Name of the treatment sheet?", &config.key_file)?;
    let data_tab = ask(
        input,
        output,
        "Name of data tab within data sheets?",
        &config.data_tab,
    )?;

    let overrides = ConfigOverrides {
        data_dir: data_dir.map(PathBuf::from),
        output_dir: output_dir.map(PathBuf::from),
        key_file,
        data_tab,
        ..ConfigOverrides::default()
    };
    Ok(overrides.apply(config))
}

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    current: &str,
) -> Result<Option<String>> {
    write!(output, "{question} {}: ", format!("[{current}]").bold())?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poxc::merge::config::{DEFAULT_DATA_TAB, DEFAULT_OUTPUT_DIR};

    #[test]
    fn empty_answers_keep_defaults() {
        let mut input = "samples\n\n  POXC_2024.xlsx  \n".as_bytes();
        let mut output = Vec::new();

        let config =
            prompt_config(Config::default(), &mut input, &mut output).expect("prompts answered");

        assert_eq!(config.data_dir, PathBuf::from("samples"));
        assert_eq!(config.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(config.key_file, "POXC_2024.xlsx");
        assert_eq!(config.data_tab, DEFAULT_DATA_TAB);
        let transcript = String::from_utf8(output).expect("prompt text is UTF-8");
        assert!(transcript.contains("Path to data directory?"));
    }
}

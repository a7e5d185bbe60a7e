use std::io;
use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use poxc_merge::config::{Config, ConfigOverrides, KeyPolicy, OutputFormat};
use poxc_merge::pipeline::{self, MergeRun};
use poxc_merge::{MergeError, Result, prompt, report};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| MergeError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Merge(args) => execute_merge(args),
        Command::Check(args) => execute_check(args),
    }
}

fn execute_merge(args: MergeArgs) -> Result<()> {
    let formats = args.format.into_iter().map(OutputFormat::from).collect();
    let config = args.source.build_config(formats)?;

    println!("\n{}", report::banner("RUNNING"));
    let output = pipeline::run(&config, Local::now().date_naive(), |outcome| {
        println!("{}", report::file_notice(outcome));
    })?;

    print!("{}", report::done_notice(&output.written));
    print!("{}", report::validation_section(&output.run.report));
    write_summary(args.source.summary.as_ref(), &output.run, &output.written)
}

fn execute_check(args: CheckArgs) -> Result<()> {
    let config = args.source.build_config(Vec::new())?;

    println!("\n{}", report::banner("RUNNING"));
    let run = pipeline::merge_sources(&config, |outcome| {
        println!("{}", report::file_notice(outcome));
    })?;

    println!(
        "> {} rows from {} of {} source files",
        run.dataset.len(),
        run.summary.merged(),
        run.summary.files.len()
    );
    print!("{}", report::validation_section(&run.report));
    write_summary(args.source.summary.as_ref(), &run, &[])
}

fn write_summary(path: Option<&PathBuf>, run: &MergeRun, written: &[PathBuf]) -> Result<()> {
    match path {
        Some(path) => pipeline::write_summary(path, run, written),
        None => Ok(()),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge per-sample workbooks with the plot/depth key workbook."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge every source workbook and write the dated output files.
    Merge(MergeArgs),
    /// Merge and validate without writing any output files.
    Check(CheckArgs),
}

#[derive(clap::Args)]
struct MergeArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output format; repeat to write several. Defaults to xlsx and csv.
    #[arg(long, value_enum)]
    format: Vec<FormatKind>,
}

#[derive(clap::Args)]
struct CheckArgs {
    #[command(flatten)]
    source: SourceArgs,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// JSON file with default settings, applied before the flags below.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the key workbook and the source workbooks.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory receiving the output files.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// File name of the key (treatment) workbook inside the data directory.
    #[arg(long)]
    key_file: Option<String>,

    /// Tab to read from every source workbook.
    #[arg(long)]
    data_tab: Option<String>,

    /// Fail when the key workbook repeats a plot/depth pair.
    #[arg(long)]
    strict_keys: bool,

    /// Prompt for directories and names, pre-filled with the current values.
    #[arg(long, short)]
    interactive: bool,

    /// Write a JSON summary of the run to this path.
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl SourceArgs {
    fn build_config(&self, formats: Vec<OutputFormat>) -> Result<Config> {
        let mut config = Config::default();
        if let Some(path) = &self.config {
            config = ConfigOverrides::from_json_file(path)?.apply(config);
        }

        let flags = ConfigOverrides {
            data_dir: self.data_dir.clone(),
            output_dir: self.output_dir.clone(),
            key_file: self.key_file.clone(),
            data_tab: self.data_tab.clone(),
            formats: Some(formats),
            key_policy: self.strict_keys.then_some(KeyPolicy::Reject),
        };
        config = flags.apply(config);

        if self.interactive {
            let stdin = io::stdin();
            config = prompt::prompt_config(config, &mut stdin.lock(), &mut io::stdout())?;
        }
        Ok(config)
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatKind {
    Xlsx,
    Csv,
}

impl From<FormatKind> for OutputFormat {
    fn from(kind: FormatKind) -> Self {
        match kind {
            FormatKind::Xlsx => OutputFormat::Xlsx,
            FormatKind::Csv => OutputFormat::Csv,
        }
    }
}

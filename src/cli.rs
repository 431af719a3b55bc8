use crate::config::{CliOverrides, Config};
use crate::error::{FormulaExtractorError, Result};
use crate::input::suggest_output_dir;
use crate::preferences::{Preferences, PREFERENCES_ENV};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "formula-extractor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract JavaScript formulas from Pepperi transaction/activity JSON")]
#[command(
    long_about = "Formula Extractor reads a transaction or activity definition exported as JSON \
                  and writes every calculated field's JSFormula to its own .js file, grouped \
                  into \"Header Fields\" and \"Line Fields\" folders."
)]
#[command(after_help = "EXAMPLES:\n  \
    formula-extractor SalesOrder.json\n  \
    formula-extractor SalesOrder.json --output ./formulas --comments false\n  \
    formula-extractor SalesOrder.json --dry-run\n  \
    formula-extractor --generate-config --config formula-extractor.toml")]
pub struct Cli {
    /// Transaction/activity JSON file (defaults to the last one used)
    pub input: Option<PathBuf>,

    /// Output folder (defaults to <input name>_extracted next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Add a metadata comment block to each generated file
    #[arg(long, help = "Add metadata header comments (true/false)")]
    pub comments: Option<bool>,

    /// Open the output folder when done
    #[arg(long, help = "Open the output folder after extraction (true/false)")]
    pub open_folder: Option<bool>,

    /// Extension of generated files
    #[arg(long, help = "File extension for generated files (default: js)")]
    pub extension: Option<String>,

    /// Write extraction_report.json into the output folder
    #[arg(long)]
    pub report: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Preferences file remembering the last run
    #[arg(long, env = PREFERENCES_ENV)]
    pub preferences: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// List the formulas that would be written without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Do not remember this run's paths and toggles
    #[arg(long)]
    pub no_remember: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    /// Config file, then remembered toggles, then explicit flags.
    pub fn load_config(&self, preferences: &Preferences) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides(preferences);
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self, preferences: &Preferences) -> CliOverrides {
        CliOverrides::default()
            .with_add_comments(self.comments.or(preferences.add_comments))
            .with_open_folder(self.open_folder.or(preferences.open_folder))
            .with_extension(self.extension.clone())
            .with_generate_report(self.report.then_some(true))
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.preferences
            .clone()
            .unwrap_or_else(Preferences::default_path)
    }

    pub fn resolve_input(&self, preferences: &Preferences) -> Result<PathBuf> {
        self.input
            .clone()
            .or_else(|| preferences.last_input.clone())
            .ok_or_else(|| FormulaExtractorError::Config {
                message: "No input file given and none remembered from a previous run".to_string(),
            })
    }

    /// An explicit `--output` wins. The remembered output only applies when
    /// the input was remembered too; a new input gets a folder next to it.
    pub fn resolve_output(&self, input: &std::path::Path, preferences: &Preferences, config: &Config) -> PathBuf {
        if let Some(ref output) = self.output {
            return output.clone();
        }

        if self.input.is_none() {
            if let Some(ref last_output) = preferences.last_output {
                return last_output.clone();
            }
        }

        suggest_output_dir(input, &config.output.output_suffix)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod input;
pub mod preferences;
pub mod sink;
pub mod ui;
pub mod writer;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, OutputConfig};
pub use error::{FormulaExtractorError, Result, UserFriendlyError};
pub use preferences::Preferences;

// Core functionality re-exports
pub use extractor::{extract_fields, ExtractedField, Section};
pub use input::{read_input, suggest_output_dir};
pub use sink::{ChannelSink, CollectingSink, NullSink, ProgressSink, SinkEvent};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};
pub use writer::{ConfigSnapshot, ExtractionReport, FormulaWriter, WriteSummary};

use std::path::{Path, PathBuf};
use tokio::task;

/// Options the core needs from the configuration.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub add_comments: bool,
    pub extension: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ExtractOptions {
    fn from(config: &Config) -> Self {
        Self {
            add_comments: config.output.add_comments,
            extension: config.output.extension.clone(),
        }
    }
}

/// Parses `json` and writes one file per calculated field under
/// `output_root`. Parse errors abort before anything is written; per-file
/// failures are reported through `sink` and collected in the summary.
pub fn extract_to_directory(
    json: &str,
    output_root: &Path,
    options: &ExtractOptions,
    sink: &dyn ProgressSink,
) -> Result<WriteSummary> {
    let fields = extract_fields(json)?;

    FormulaWriter::new()
        .with_add_comments(options.add_comments)
        .with_extension(options.extension.as_str())
        .write_all(&fields, output_root, sink)
}

/// Reads the input file, then runs [`extract_to_directory`].
pub fn extract_file(
    input: &Path,
    output_root: &Path,
    options: &ExtractOptions,
    sink: &dyn ProgressSink,
) -> Result<WriteSummary> {
    let json = read_input(input)?;
    extract_to_directory(&json, output_root, options, sink)
}

/// Main library interface: one extraction run with terminal reporting.
pub struct FormulaExtractor {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl FormulaExtractor {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    pub fn from_cli(cli_args: &Cli, preferences: &Preferences) -> Result<Self> {
        let config = cli_args.load_config(preferences)?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(
            config,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Runs load, extract and write on a blocking worker while this task
    /// applies the worker's progress and log events to the terminal.
    pub async fn extract(&self, input: &Path, output_root: &Path) -> Result<ExtractionReport> {
        crate::input::ensure_input_exists(input)?;

        self.output_formatter.start_operation("Extracting formulas");
        self.output_formatter
            .info(&format!("Input: {}", input.display()));
        self.output_formatter
            .info(&format!("Output: {}", output_root.display()));

        let progress_bar = self.progress_manager.create_write_progress();
        let (sink, mut events) = ChannelSink::new();
        let options = ExtractOptions::from(&self.config);
        let worker_input: PathBuf = input.to_path_buf();
        let worker_output: PathBuf = output_root.to_path_buf();

        let worker = task::spawn_blocking(move || {
            extract_file(&worker_input, &worker_output, &options, &sink)
        });

        // The channel closes when the worker drops its sink.
        while let Some(event) = events.recv().await {
            match event {
                SinkEvent::Progress { message, percent } => {
                    ui::progress::update_write_progress(&progress_bar, &message, percent);
                }
                SinkEvent::Log { message } => {
                    self.progress_manager
                        .suspend(|| self.output_formatter.writer_log(&message));
                }
            }
        }

        let outcome = worker.await.map_err(|e| FormulaExtractorError::Worker {
            message: e.to_string(),
        })?;

        let summary = match outcome {
            Ok(summary) => summary,
            Err(e) => {
                progress_bar.abandon_with_message("Extraction failed");
                return Err(e);
            }
        };

        ui::progress::finish_progress_with_summary(
            &progress_bar,
            &format!("Generated {} files", summary.written_count()),
            summary.elapsed(),
        );

        let report = ExtractionReport::new(input, output_root, &summary, self.config.snapshot());

        if self.config.output.generate_report {
            let report_path = report.save_json()?;
            self.output_formatter
                .info(&format!("Report saved to {}", report_path.display()));
        }

        if self.config.output.open_folder {
            self.open_output_folder(output_root);
        }

        Ok(report)
    }

    /// Parses the input without writing anything.
    pub fn preview(&self, input: &Path) -> Result<Vec<ExtractedField>> {
        let spinner = self.progress_manager.create_spinner("Parsing definition...");
        let fields = read_input(input).and_then(|json| extract_fields(&json));
        spinner.finish_and_clear();
        fields
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::default().save_to_file(output_path)
    }

    fn open_output_folder(&self, output_root: &Path) {
        if let Err(e) = open::that(output_root) {
            self.output_formatter.warning(&format!(
                "Could not open {}: {}",
                output_root.display(),
                e
            ));
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn handle_error(&self, error: &FormulaExtractorError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

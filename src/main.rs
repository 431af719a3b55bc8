use clap::Parser;
use formula_extractor::{
    Cli, FormulaExtractor, FormulaExtractorError, OutputFormatter, OutputMode, Preferences,
    UserFriendlyError,
};
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let preferences_path = cli.preferences_path();
    let (mut preferences, preferences_warning) = match Preferences::load(&preferences_path) {
        Ok(preferences) => (preferences, None),
        Err(e) => (Preferences::default(), Some(e)),
    };

    let extractor = match FormulaExtractor::from_cli(&cli, &preferences) {
        Ok(extractor) => extractor,
        Err(e) => {
            print_startup_error(&e);
            return e.exit_code();
        }
    };
    let formatter = extractor.output_formatter();

    if let Some(e) = preferences_warning {
        formatter.warning(&format!("Ignoring saved preferences: {}", e.user_message()));
    }

    let input = match cli.resolve_input(&preferences) {
        Ok(input) => input,
        Err(e) => {
            extractor.handle_error(&e);
            return e.exit_code();
        }
    };
    let output = cli.resolve_output(&input, &preferences, extractor.config());

    if cli.dry_run {
        return handle_dry_run(&extractor, &input, &output);
    }

    match extractor.extract(&input, &output).await {
        Ok(report) => {
            formatter.print_extraction_report(&report);

            if !cli.no_remember {
                preferences.remember_run(&input, &output, cli.comments, cli.open_folder);
                if let Err(e) = preferences.save(&preferences_path) {
                    formatter.warning(&format!("Could not save preferences: {}", e.user_message()));
                }
            }

            if report.has_errors() {
                2
            } else {
                0
            }
        }
        Err(e) => {
            extractor.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "formula-extractor.toml".to_string());

    match FormulaExtractor::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  formula-extractor <input.json> --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            e.exit_code()
        }
    }
}

fn handle_dry_run(extractor: &FormulaExtractor, input: &Path, output: &Path) -> i32 {
    let formatter = extractor.output_formatter();
    let config = extractor.config();

    formatter.print_header("Dry run");
    formatter.info("DRY RUN MODE - No files will be written");

    let fields = match extractor.preview(input) {
        Ok(fields) => fields,
        Err(e) => {
            extractor.handle_error(&e);
            return e.exit_code();
        }
    };

    formatter.info(&format!("Input: {}", input.display()));
    formatter.info(&format!("Output folder: {}", output.display()));
    formatter.info(&format!(
        "Comments: {}, extension: .{}",
        config.output.add_comments, config.output.extension
    ));

    formatter.print_field_listing(&fields, &config.output.extension);
    formatter.print_separator();
    formatter.success(&format!("{} formulas would be written", fields.len()));

    0
}

fn print_startup_error(error: &FormulaExtractorError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

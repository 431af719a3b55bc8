use crate::error::{FormulaExtractorError, Result};
use crate::input::DEFAULT_OUTPUT_SUFFIX;
use crate::writer::formula_writer::DEFAULT_EXTENSION;
use crate::writer::ConfigSnapshot;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub add_comments: bool,
    pub open_folder: bool,
    pub extension: String,
    pub generate_report: bool,
    pub output_suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            add_comments: true,
            open_folder: true,
            extension: DEFAULT_EXTENSION.to_string(),
            generate_report: false,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(FormulaExtractorError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| FormulaExtractorError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| FormulaExtractorError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["formula-extractor.toml", ".formula-extractor.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(add_comments) = cli_args.add_comments {
            self.output.add_comments = add_comments;
        }

        if let Some(open_folder) = cli_args.open_folder {
            self.output.open_folder = open_folder;
        }

        if let Some(ref extension) = cli_args.extension {
            self.output.extension = extension.trim().trim_start_matches('.').to_string();
        }

        if let Some(generate_report) = cli_args.generate_report {
            self.output.generate_report = generate_report;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| FormulaExtractorError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| FormulaExtractorError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let extension = &self.output.extension;

        if extension.is_empty() {
            return Err(FormulaExtractorError::Config {
                message: "Output file extension must not be empty".to_string(),
            });
        }

        if extension
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '.') || c.is_whitespace() || c.is_control())
        {
            return Err(FormulaExtractorError::Config {
                message: format!("Invalid output file extension: {:?}", extension),
            });
        }

        if self.output.output_suffix.contains(&['/', '\\'][..]) {
            return Err(FormulaExtractorError::Config {
                message: format!(
                    "Output folder suffix cannot contain path separators: {:?}",
                    self.output.output_suffix
                ),
            });
        }

        Ok(())
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            add_comments: self.output.add_comments,
            extension: self.output.extension.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub add_comments: Option<bool>,
    pub open_folder: Option<bool>,
    pub extension: Option<String>,
    pub generate_report: Option<bool>,
}

impl CliOverrides {
    pub fn with_add_comments(mut self, add_comments: Option<bool>) -> Self {
        self.add_comments = add_comments;
        self
    }

    pub fn with_open_folder(mut self, open_folder: Option<bool>) -> Self {
        self.open_folder = open_folder;
        self
    }

    pub fn with_extension(mut self, extension: Option<String>) -> Self {
        self.extension = extension;
        self
    }

    pub fn with_generate_report(mut self, generate_report: Option<bool>) -> Self {
        self.generate_report = generate_report;
        self
    }
}

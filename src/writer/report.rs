use crate::error::{FormulaExtractorError, Result};
use crate::extractor::Section;
use crate::writer::WriteSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const REPORT_FILE_NAME: &str = "extraction_report.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub input_file: PathBuf,
    pub output_directory: PathBuf,
    pub extraction_time: DateTime<Utc>,
    pub extraction_duration: Duration,
    pub fields_found: usize,
    pub files_written: usize,
    pub files_by_section: BTreeMap<Section, usize>,
    pub files: Vec<String>,
    pub errors: Vec<String>,
    pub config_used: ConfigSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub add_comments: bool,
    pub extension: String,
}

impl ExtractionReport {
    pub fn new(
        input_file: &Path,
        output_directory: &Path,
        summary: &WriteSummary,
        config: ConfigSnapshot,
    ) -> Self {
        let files = summary
            .files_written
            .iter()
            .map(|path| {
                path.strip_prefix(output_directory)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();

        Self {
            input_file: input_file.to_path_buf(),
            output_directory: output_directory.to_path_buf(),
            extraction_time: Utc::now(),
            extraction_duration: summary.elapsed(),
            fields_found: summary.total_fields,
            files_written: summary.written_count(),
            files_by_section: summary.files_by_section.clone(),
            files,
            errors: summary.errors.clone(),
            config_used: config,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn section_count(&self, section: Section) -> usize {
        self.files_by_section.get(&section).copied().unwrap_or(0)
    }

    /// Saves the report as pretty JSON in the output directory.
    pub fn save_json(&self) -> Result<PathBuf> {
        let report_path = self.output_directory.join(REPORT_FILE_NAME);
        let json_content =
            serde_json::to_string_pretty(self).map_err(|e| FormulaExtractorError::Config {
                message: format!("Failed to serialize report to JSON: {}", e),
            })?;

        fs::write(&report_path, json_content)?;

        Ok(report_path)
    }
}

use crate::error::{FormulaExtractorError, Result};
use crate::extractor::{ExtractedField, Section};
use crate::sink::ProgressSink;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

pub const DEFAULT_EXTENSION: &str = "js";
pub const NO_PARTICIPATING_FIELDS: &str = "No Participating Fields";
const WRITE_BUFFER_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone)]
pub struct WriteSummary {
    pub total_fields: usize,
    pub files_written: Vec<PathBuf>,
    pub files_by_section: BTreeMap<Section, usize>,
    pub start_time: Instant,
    pub errors: Vec<String>,
}

impl WriteSummary {
    pub fn new(total_fields: usize) -> Self {
        Self {
            total_fields,
            files_written: Vec::new(),
            files_by_section: BTreeMap::new(),
            start_time: Instant::now(),
            errors: Vec::new(),
        }
    }

    pub fn record_written(&mut self, section: Section, path: PathBuf) {
        *self.files_by_section.entry(section).or_insert(0) += 1;
        self.files_written.push(path);
    }

    pub fn add_error<S: Into<String>>(&mut self, error: S) {
        self.errors.push(error.into());
    }

    pub fn written_count(&self) -> usize {
        self.files_written.len()
    }

    pub fn failed_count(&self) -> usize {
        self.errors.len()
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Cumulative percentage after `processed` of `total` records.
pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        0
    } else {
        (processed.min(total) * 100 / total) as u8
    }
}

pub struct FormulaWriter {
    add_comments: bool,
    extension: String,
}

impl FormulaWriter {
    pub fn new() -> Self {
        Self {
            add_comments: true,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_add_comments(mut self, add_comments: bool) -> Self {
        self.add_comments = add_comments;
        self
    }

    pub fn with_extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.extension = extension.into();
        self
    }

    /// Writes one file per field under `output_root`, reporting each success
    /// to `sink` with the share of fields written so far. A field that cannot be written is logged and skipped; only
    /// failing to create the directory tree aborts the pass.
    pub fn write_all(
        &self,
        fields: &[ExtractedField],
        output_root: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<WriteSummary> {
        self.prepare_directories(output_root)?;

        let total = fields.len();
        let mut summary = WriteSummary::new(total);
        let mut processed = 0;

        for field in fields {
            let file_name = field.file_name(&self.extension);

            match self.write_field(field, output_root) {
                Ok(path) => {
                    let message = format!("Generated: {}", field.display_path(&self.extension));
                    processed += 1;
                    sink.log(&message);
                    sink.update(&message, progress_percent(processed, total));
                    summary.record_written(field.section, path);
                }
                Err(e) => {
                    let reason = match &e {
                        FormulaExtractorError::FieldWrite { source, .. } => source.to_string(),
                        other => other.to_string(),
                    };
                    let message = format!("Failed: {} -> {}", file_name, reason);
                    sink.log(&message);
                    summary.add_error(message);
                }
            }
        }

        Ok(summary)
    }

    /// Creates the root and one subdirectory per section.
    pub fn prepare_directories(&self, output_root: &Path) -> Result<()> {
        fs::create_dir_all(output_root)?;
        for section in Section::ALL {
            fs::create_dir_all(section_dir(output_root, section))?;
        }
        Ok(())
    }

    pub fn destination_path(&self, field: &ExtractedField, output_root: &Path) -> PathBuf {
        section_dir(output_root, field.section).join(field.file_name(&self.extension))
    }

    /// Full file contents for a field: optional header block, then the body.
    pub fn render(&self, field: &ExtractedField) -> String {
        let mut content = String::with_capacity(field.formula.len() + 256);

        if self.add_comments {
            content.push_str(&render_header(field));
        }

        content.push_str(&field.formula);
        if !field.formula.ends_with('\n') {
            content.push('\n');
        }

        content
    }

    fn write_field(&self, field: &ExtractedField, output_root: &Path) -> Result<PathBuf> {
        validate_label(&field.label)?;

        let path = self.destination_path(field, output_root);
        let to_field_error = |source: std::io::Error| FormulaExtractorError::FieldWrite {
            path: path.display().to_string(),
            source,
        };

        let file = fs::File::create(&path).map_err(to_field_error)?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        writer
            .write_all(self.render(field).as_bytes())
            .map_err(to_field_error)?;
        writer.flush().map_err(to_field_error)?;

        Ok(path)
    }
}

impl Default for FormulaWriter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn section_dir(output_root: &Path, section: Section) -> PathBuf {
    output_root.join(section.display_name())
}

fn render_header(field: &ExtractedField) -> String {
    let mut header = String::new();

    header.push_str("/**\n");
    header.push_str(&format!(" * Section: {}\n", field.section));
    header.push_str(&format!(" * FieldID: {}\n", field.field_id));
    header.push_str(&format!(" * Label:   {}\n", field.label));
    header.push_str(&format!(" * Type:    {}\n", field.field_type));
    header.push_str(&format!(" * Trigger: {}\n", field.trigger));

    if field.participating_fields.is_empty() {
        header.push_str(&format!(" * Participating Fields: {} \n", NO_PARTICIPATING_FIELDS));
    } else {
        header.push_str(" * Participating Fields: \n");
        for participant in &field.participating_fields {
            header.push_str(&format!(" * \t\t{}\n", participant));
        }
    }

    // Trailing spaces are part of the file format.
    header.push_str(" */\n");
    header.push_str(" \n");
    header
}

// The label becomes a file name inside the section directory and must stay there.
fn validate_label(label: &str) -> Result<()> {
    let escapes = label.is_empty()
        || label.contains('/')
        || label.contains('\\')
        || Path::new(label)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));

    if escapes {
        return Err(FormulaExtractorError::InvalidPath {
            path: format!("label cannot be used as a file name: {:?}", label),
        });
    }

    Ok(())
}

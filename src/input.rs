use crate::error::{FormulaExtractorError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_SUFFIX: &str = "_extracted";

/// Reads the JSON definition. A path that does not name an existing file is
/// reported before anything is parsed.
pub fn read_input<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();

    ensure_input_exists(path)?;

    Ok(fs::read_to_string(path)?)
}

pub fn ensure_input_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(FormulaExtractorError::InputNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

/// Default output folder: next to the input, named after it plus `suffix`.
pub fn suggest_output_dir(input: &Path, suffix: &str) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let stem = file_name.strip_suffix(".json").unwrap_or(&file_name);
    let name = if stem.is_empty() {
        format!("output{}", suffix)
    } else {
        format!("{}{}", stem, suffix)
    };

    match input.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

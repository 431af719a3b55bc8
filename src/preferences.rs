//! Remembered user choices between runs: last input file, last output
//! folder and the two output toggles. Only the binary loads and saves these;
//! library code receives plain values.

use crate::error::{FormulaExtractorError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const PREFERENCES_ENV: &str = "FORMULA_EXTRACTOR_PREFERENCES";
const APP_DIR: &str = "formula-extractor";
const PREFERENCES_FILE: &str = "preferences.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Preferences {
    pub last_input: Option<PathBuf>,
    pub last_output: Option<PathBuf>,
    pub add_comments: Option<bool>,
    pub open_folder: Option<bool>,
}

impl Preferences {
    /// `<config dir>/formula-extractor/preferences.toml`, falling back to the
    /// working directory on platforms without a config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(PREFERENCES_FILE)
    }

    /// Missing file means nothing remembered yet.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| FormulaExtractorError::Config {
            message: format!("Failed to read preferences {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| FormulaExtractorError::Config {
            message: format!("Failed to parse preferences {}: {}", path.display(), e),
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| FormulaExtractorError::Config {
                    message: format!(
                        "Failed to create preferences directory {}: {}",
                        parent.display(),
                        e
                    ),
                })?;
            }
        }

        let content = toml::to_string_pretty(self).map_err(|e| FormulaExtractorError::Config {
            message: format!("Failed to serialize preferences: {}", e),
        })?;

        fs::write(path, content).map_err(|e| FormulaExtractorError::Config {
            message: format!("Failed to write preferences {}: {}", path.display(), e),
        })
    }

    /// Toggles are only remembered when given explicitly; `None` keeps the
    /// previous choice so config file values stay in effect.
    pub fn remember_run(
        &mut self,
        input: &Path,
        output: &Path,
        add_comments: Option<bool>,
        open_folder: Option<bool>,
    ) {
        self.last_input = Some(absolute(input));
        self.last_output = Some(absolute(output));
        if add_comments.is_some() {
            self.add_comments = add_comments;
        }
        if open_folder.is_some() {
            self.open_folder = open_folder;
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

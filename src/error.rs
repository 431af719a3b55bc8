use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormulaExtractorError {
    #[error("Failed to parse JSON definition: {message}")]
    Parse { message: String },

    #[error("Failed to write {path}: {source}")]
    FieldWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Extraction worker failed: {message}")]
    Worker { message: String },
}

impl FormulaExtractorError {
    pub fn parse<S: Into<String>>(message: S) -> Self {
        FormulaExtractorError::Parse {
            message: message.into(),
        }
    }

    /// Process exit code used by the binary for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            FormulaExtractorError::InputNotFound { .. } => 3,
            FormulaExtractorError::Parse { .. } => 4,
            FormulaExtractorError::Config { .. } => 5,
            _ => 1,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for FormulaExtractorError {
    fn user_message(&self) -> String {
        match self {
            FormulaExtractorError::Parse { message } => {
                format!("Invalid transaction definition: {}", message)
            }
            FormulaExtractorError::FieldWrite { path, source } => {
                format!("Could not write {}: {}", path, source)
            }
            FormulaExtractorError::InputNotFound { path } => {
                format!("Input file not found: {}", path)
            }
            FormulaExtractorError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            FormulaExtractorError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            FormulaExtractorError::Parse { .. } => Some(
                "Make sure the file is a transaction or activity definition exported as JSON, with \"Fields\" and \"LineFields\" arrays at the top level.".to_string()
            ),
            FormulaExtractorError::InputNotFound { .. } => Some(
                "Check the path of the JSON file, or pass it explicitly as the first argument.".to_string()
            ),
            FormulaExtractorError::Io(_) | FormulaExtractorError::FieldWrite { .. } => Some(
                "Ensure you have the necessary read/write permissions for the output folder.".to_string()
            ),
            FormulaExtractorError::InvalidPath { .. } => Some(
                "Rename the field label in the source definition so it contains no path separators.".to_string()
            ),
            FormulaExtractorError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FormulaExtractorError {
    fn from(error: serde_json::Error) -> Self {
        FormulaExtractorError::Parse {
            message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for FormulaExtractorError {
    fn from(error: toml::de::Error) -> Self {
        FormulaExtractorError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormulaExtractorError>;

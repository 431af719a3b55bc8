use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_LABEL: &str = "No Label";
pub const DEFAULT_TYPE: &str = "Unknown";

/// The two kinds of field descriptors a transaction definition carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "Header Fields")]
    HeaderFields,
    #[serde(rename = "Line Fields")]
    LineFields,
}

impl Section {
    /// Processing order: header fields first.
    pub const ALL: [Section; 2] = [Section::HeaderFields, Section::LineFields];

    /// Top-level array key in the source document.
    pub fn json_key(&self) -> &'static str {
        match self {
            Section::HeaderFields => "Fields",
            Section::LineFields => "LineFields",
        }
    }

    /// Human-readable name, also used as the output subdirectory.
    pub fn display_name(&self) -> &'static str {
        match self {
            Section::HeaderFields => "Header Fields",
            Section::LineFields => "Line Fields",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One calculated field pulled out of the definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedField {
    pub section: Section,
    pub field_id: String,
    pub label: String,
    pub field_type: String,
    pub trigger: String,
    pub formula: String,
    pub participating_fields: Vec<String>,
}

impl ExtractedField {
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.label, extension)
    }

    /// `<section>/<label>.<ext>`, as shown in progress messages.
    pub fn display_path(&self, extension: &str) -> String {
        format!("{}/{}", self.section, self.file_name(extension))
    }
}

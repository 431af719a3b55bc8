pub mod field;
pub mod parser;

pub use field::{ExtractedField, Section};
pub use parser::extract_fields;

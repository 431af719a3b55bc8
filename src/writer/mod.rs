pub mod formula_writer;
pub mod report;

pub use formula_writer::{progress_percent, section_dir, FormulaWriter, WriteSummary};
pub use report::{ConfigSnapshot, ExtractionReport};

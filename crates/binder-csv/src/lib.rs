//! # binder-csv
//!
//! CSV reader for binder. The whole file becomes the single sheet of a
//! workbook; the first record is kept as an ordinary row so that the
//! extractor sees the header like any other spreadsheet export.

mod error;
mod options;
mod reader;

pub use error::{CsvError, CsvResult};
pub use options::CsvReadOptions;
pub use reader::CsvReader;

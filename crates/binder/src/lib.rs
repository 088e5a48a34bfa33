//! # binder
//!
//! Tools for card collections kept in spreadsheets.
//!
//! A collection is a sheet with a `Name` and a `Status` column, exported as
//! XLSX, CSV or a JSON workbook dump. This crate ties the pieces together:
//!
//! - load the file ([`WorkbookExt::open`]) and extract [`CardRecord`]s
//!   ([`process_file`], or [`load_records`] for both steps);
//! - resolve the names against the card catalog ([`FetchPipeline`]);
//! - summarize the collection ([`CollectionStats`]).
//!
//! ## Example
//!
//! ```rust
//! use binder::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.first_sheet_mut().unwrap();
//! sheet.set_cell_value("A1", "Name").unwrap();
//! sheet.set_cell_value("B1", "Status").unwrap();
//! sheet.set_cell_value("A2", "Opt").unwrap();
//! sheet.set_cell_value("B2", "OWNED").unwrap();
//!
//! let records = process_file(&workbook, &ExtractOptions::default());
//! let stats = CollectionStats::compute(&records, &MemoryCache::new());
//! assert_eq!(stats.count(Status::Owned), 1);
//! assert_eq!(stats.unresolved, vec!["Opt".to_string()]);
//! ```

pub mod prelude;
pub mod stats;

pub use stats::CollectionStats;

// Re-export core types
pub use binder_core::{
    is_metadata_key, Cell, CellAddress, CellError, CellRange, CellType, CellValue, Error, Result,
    Sheet, Workbook, MAX_COLS, MAX_ROWS, MAX_SHEET_NAME_LEN, METADATA_PREFIX, RANGE_KEY,
};

// Re-export extraction
pub use binder_extract::{
    process_file, process_sheet, CardRecord, ColumnOrder, ExtractOptions, GapFill, LogicalTable,
    ParseStatusError, Status,
};

// Re-export catalog types
pub use binder_catalog::{
    CardCache, CardSet, CatalogClient, CatalogError, ClientConfig, EnrichedCard, FetchPipeline,
    FetchReport, FetchStatus, HttpCatalogClient, JsonFileCache, MemoryCache, SetIndex, SetRef,
    DEFAULT_BASE_URL, DEFAULT_DELAY,
};

// Re-export I/O types
#[cfg(feature = "csv")]
pub use binder_csv::{CsvError, CsvReadOptions, CsvReader};
#[cfg(feature = "xlsx")]
pub use binder_xlsx::{XlsxError, XlsxReader};

use std::path::Path;

/// Extension trait for Workbook to add file I/O
pub trait WorkbookExt {
    /// Open a workbook from a file, choosing the reader by extension
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        tracing::debug!(path = %path.display(), "opening workbook");

        match extension.as_deref() {
            #[cfg(feature = "xlsx")]
            Some("xlsx") | Some("xlsm") => {
                XlsxReader::read_file(path).map_err(|e| Error::other(e.to_string()))
            }
            #[cfg(feature = "csv")]
            Some("csv") => CsvReader::read_file(path, &CsvReadOptions::default())
                .map_err(|e| Error::other(e.to_string())),
            #[cfg(feature = "json")]
            Some("json") => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| Error::other(format!("{}: {}", path.display(), e)))?;
                serde_json::from_str(&text).map_err(|e| Error::other(e.to_string()))
            }
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }
}

/// Open a collection file and extract its card records
pub fn load_records<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Vec<CardRecord>> {
    let workbook = Workbook::open(path)?;
    Ok(process_file(&workbook, options))
}

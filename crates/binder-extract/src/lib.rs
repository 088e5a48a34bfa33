//! # binder-extract
//!
//! Turns the first sheet of an imported workbook into card records.
//!
//! The sheet is expected to hold a table whose first populated row names the
//! columns; the `Name` and `Status` columns are read, every other column is
//! ignored. Spreadsheet exports omit empty cells and do not order their keys,
//! so the table is rebuilt from addresses first (see [`LogicalTable`]).
//!
//! This is a best-effort parser, not a validating one: malformed addresses
//! are skipped, missing names become `""` and missing or unknown statuses
//! become [`Status::NotOwned`]. Nothing here returns an error.
//!
//! ## Example
//!
//! ```rust
//! use binder_core::Workbook;
//! use binder_extract::{process_file, CardRecord, ExtractOptions, Status};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.first_sheet_mut().unwrap();
//! sheet.set_cell_value("A1", "Name").unwrap();
//! sheet.set_cell_value("B1", "Status").unwrap();
//! sheet.set_cell_value("A2", "Opt").unwrap();
//! sheet.set_cell_value("B2", "OWNED").unwrap();
//!
//! let records = process_file(&workbook, &ExtractOptions::default());
//! assert_eq!(records, vec![CardRecord::new("Opt", Status::Owned)]);
//! ```

mod error;
mod options;
mod project;
mod record;
mod table;

pub use error::ParseStatusError;
pub use options::{ColumnOrder, ExtractOptions, GapFill};
pub use project::{coerce_text, project, NAME_COLUMN, STATUS_COLUMN};
pub use record::{CardRecord, Status};
pub use table::{LogicalCell, LogicalRow, LogicalTable};

use binder_core::{Sheet, Workbook};

/// Extract card records from the first sheet of a workbook
///
/// A workbook without sheets yields no records.
pub fn process_file(workbook: &Workbook, options: &ExtractOptions) -> Vec<CardRecord> {
    match workbook.first_sheet() {
        Some(sheet) => process_sheet(sheet, options),
        None => {
            tracing::debug!("workbook has no sheets, nothing to extract");
            Vec::new()
        }
    }
}

/// Extract card records from one sheet
pub fn process_sheet(sheet: &Sheet, options: &ExtractOptions) -> Vec<CardRecord> {
    let table = LogicalTable::from_sheet(sheet, options);
    let records = project(&table);
    tracing::debug!(
        sheet = sheet.name(),
        rows = table.len(),
        records = records.len(),
        "extracted card records"
    );
    records
}

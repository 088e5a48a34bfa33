//! # binder-core
//!
//! Core data structures shared by the binder crates.
//!
//! A spreadsheet is modelled the way spreadsheet tooling usually exports it:
//! a sheet is a sparse, unordered mapping from A1-style address strings to
//! cells. Nothing guarantees that every cell of a row is present, so code
//! that needs a table must rebuild one (see `binder-extract`).
//!
//! - [`CellValue`], [`Cell`] and [`CellType`] - what a cell holds
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing
//! - [`Sheet`] and [`Workbook`] - the sparse sheet and its ordered container
//!
//! ## Example
//!
//! ```rust
//! use binder_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.first_sheet_mut().unwrap();
//!
//! sheet.set_cell_value("A1", "Name").unwrap();
//! sheet.set_cell_value_at(1, 0, "Opt");
//!
//! assert_eq!(sheet.get("A2").map(|c| &c.value), Some(&CellValue::string("Opt")));
//! ```

pub mod cell;
pub mod error;
pub mod sheet;
pub mod workbook;

#[cfg(feature = "serde")]
mod sheetjs;

// Re-exports for convenience
pub use cell::{Cell, CellAddress, CellError, CellRange, CellType, CellValue};
pub use error::{Error, Result};
pub use sheet::{is_metadata_key, Sheet, METADATA_PREFIX, RANGE_KEY};
pub use workbook::Workbook;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

//! Cell-related types
//!
//! - [`CellValue`] - The value stored in a cell
//! - [`Cell`] - A value plus its display string
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A range of cells (e.g., "A1:B10")

mod address;
mod value;

pub use address::{CellAddress, CellRange};
pub use value::{Cell, CellError, CellType, CellValue};

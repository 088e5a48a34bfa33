//! Projection of logical rows onto card records

use binder_core::CellValue;

use crate::record::{CardRecord, Status};
use crate::table::{LogicalRow, LogicalTable};

/// Header text of the card name column
pub const NAME_COLUMN: &str = "Name";

/// Header text of the ownership status column
pub const STATUS_COLUMN: &str = "Status";

/// Build one record per data row
///
/// Column names come from the header cell at the same position. Only string
/// headers can name a column; cells past the header's width are ignored.
pub fn project(table: &LogicalTable) -> Vec<CardRecord> {
    let Some(header) = table.header() else {
        return Vec::new();
    };

    let columns: Vec<Option<&str>> = header
        .cells
        .iter()
        .map(|c| c.cell.value.as_string())
        .collect();

    table
        .data_rows()
        .map(|row| project_row(row, &columns))
        .collect()
}

fn project_row(row: &LogicalRow, columns: &[Option<&str>]) -> CardRecord {
    let mut record = CardRecord::default();

    for (cell, column) in row.cells.iter().zip(columns) {
        match *column {
            Some(NAME_COLUMN) => record.name = coerce_text(&cell.cell.value),
            Some(STATUS_COLUMN) => {
                record.status = Status::parse(&coerce_text(&cell.cell.value)).unwrap_or_default()
            }
            _ => {}
        }
    }

    record
}

/// Text form of a cell value as used for record fields
///
/// Integral numbers lose their fractional part (`42`, not `42.0`), booleans
/// are spelled `true`/`false`, errors use their code.
pub fn coerce_text(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Boolean(b) => b.to_string(),
        CellValue::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        CellValue::String(s) => s.clone(),
        CellValue::Error(e) => e.as_str().to_string(),
        CellValue::Date(d) => d.clone(),
    }
}

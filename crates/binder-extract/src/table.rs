//! Logical table recovery
//!
//! A sheet only stores the cells that hold something, keyed by address
//! strings in no particular order. This module rebuilds rows from those keys:
//!
//! 1. metadata keys are dropped and the remaining keys are parsed into
//!    `(column, row)`; keys that are not `LETTERS DIGITS` are skipped;
//! 2. keys are sorted by row, then by column;
//! 3. consecutive keys sharing a row number form one [`LogicalRow`], rows
//!    being numbered from 0 whatever the sheet's first row number is;
//! 4. depending on [`GapFill`], empty cells are synthesized where columns
//!    were skipped so that position `i` of every row lines up with position
//!    `i` of the header row. With [`GapFill::AllColumns`], data cells left of
//!    the header's first column have no header position and are dropped.

use std::cmp::Ordering;

use binder_core::{is_metadata_key, Cell, CellAddress, CellValue, Sheet};
use lazy_regex::regex_captures;

use crate::options::{ColumnOrder, ExtractOptions, GapFill};

/// A parsed data key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SheetKey<'a> {
    /// Key as stored in the sheet
    pub(crate) raw: &'a str,
    /// Column label (e.g. "AB")
    pub(crate) label: &'a str,
    /// 0-based column index
    pub(crate) column: u16,
    /// Row number exactly as written (1-based in well-formed sheets)
    pub(crate) row: u32,
}

impl<'a> SheetKey<'a> {
    /// Parse a key of the form `LETTERS DIGITS`
    ///
    /// Letters must be upper case. Labels beyond the last spreadsheet column
    /// and row numbers that overflow are rejected like any other malformed
    /// key.
    pub(crate) fn parse(raw: &'a str) -> Option<Self> {
        let (_, label, row) = regex_captures!(r"^([A-Z]+)([0-9]+)$", raw)?;
        let row = row.parse().ok()?;
        let column = CellAddress::letters_to_column(label).ok()?;
        Some(Self {
            raw,
            label,
            column,
            row,
        })
    }

    fn compare(&self, other: &Self, order: ColumnOrder) -> Ordering {
        let by_column = match order {
            ColumnOrder::Spreadsheet => self.column.cmp(&other.column),
            ColumnOrder::Lexicographic => self.label.cmp(other.label),
        };
        self.row.cmp(&other.row).then(by_column)
    }
}

/// Data keys of a sheet, parsed and sorted
pub(crate) fn ordered_keys(sheet: &Sheet, order: ColumnOrder) -> Vec<SheetKey<'_>> {
    let mut keys: Vec<SheetKey<'_>> = sheet
        .keys()
        .filter(|key| !is_metadata_key(key))
        .filter_map(|key| {
            let parsed = SheetKey::parse(key);
            if parsed.is_none() {
                tracing::trace!(key, "skipping malformed cell address");
            }
            parsed
        })
        .collect();

    keys.sort_by(|a, b| a.compare(b, order));
    keys
}

/// One cell of a logical row
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalCell {
    /// Address key; for synthesized cells, the column label plus the row
    /// number
    pub key: String,
    /// 0-based column index
    pub column: u16,
    /// Cell contents
    pub cell: Cell,
    /// Whether the cell was inserted to fill a gap
    pub synthetic: bool,
}

impl LogicalCell {
    fn synthetic(label: &str, column: u16, row_number: u32) -> Self {
        Self {
            key: format!("{}{}", label, row_number),
            column,
            cell: Cell::new(CellValue::string("")),
            synthetic: true,
        }
    }
}

/// Cells sharing one row number, in column order
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalRow {
    /// Row number as written in the sheet
    pub row_number: u32,
    /// Cells in column order
    pub cells: Vec<LogicalCell>,
}

impl LogicalRow {
    fn new(row_number: u32) -> Self {
        Self {
            row_number,
            cells: Vec::new(),
        }
    }

    /// Number of cells, synthesized ones included
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at a position
    pub fn get(&self, position: usize) -> Option<&LogicalCell> {
        self.cells.get(position)
    }

    fn first_column(&self) -> Option<u16> {
        self.cells.first().map(|c| c.column)
    }

    fn last_column(&self) -> Option<u16> {
        self.cells.last().map(|c| c.column)
    }

    fn push_gap(&mut self, label: &str, column: u16) {
        let cell = LogicalCell::synthetic(label, column, self.row_number);
        self.cells.push(cell);
    }
}

/// Ordered rows recovered from a sheet; row 0 is the header
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogicalTable {
    rows: Vec<LogicalRow>,
}

impl LogicalTable {
    /// Rebuild the table of a sheet
    pub fn from_sheet(sheet: &Sheet, options: &ExtractOptions) -> Self {
        let mut builder = TableBuilder::new(options);
        for key in ordered_keys(sheet, options.column_order) {
            if let Some(cell) = sheet.get(key.raw) {
                builder.push(&key, cell);
            }
        }
        builder.finish()
    }

    /// The header row, if the sheet had any data cell
    pub fn header(&self) -> Option<&LogicalRow> {
        self.rows.first()
    }

    /// Every row after the header
    pub fn data_rows(&self) -> impl Iterator<Item = &LogicalRow> {
        self.rows.iter().skip(1)
    }

    /// All rows, header first
    pub fn rows(&self) -> &[LogicalRow] {
        &self.rows
    }

    /// Number of rows, header included
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row was recovered
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

struct TableBuilder {
    gap_fill: GapFill,
    column_order: ColumnOrder,
    rows: Vec<LogicalRow>,
    current: Option<LogicalRow>,
}

impl TableBuilder {
    fn new(options: &ExtractOptions) -> Self {
        Self {
            gap_fill: options.gap_fill,
            column_order: options.column_order,
            rows: Vec::new(),
            current: None,
        }
    }

    /// Whether a key sorts before the header's first cell
    fn before_header(&self, key: &SheetKey<'_>) -> bool {
        let Some(first) = self.rows.first().and_then(LogicalRow::first_column) else {
            return false;
        };
        match self.column_order {
            ColumnOrder::Spreadsheet => key.column < first,
            ColumnOrder::Lexicographic => {
                key.label < CellAddress::column_to_letters(first).as_str()
            }
        }
    }

    fn push(&mut self, key: &SheetKey<'_>, cell: &Cell) {
        if self.current.as_ref().map(|r| r.row_number) != Some(key.row) {
            self.finish_row();
            self.current = Some(LogicalRow::new(key.row));
        }

        if self.gap_fill == GapFill::AllColumns && self.before_header(key) {
            tracing::trace!(key = key.raw, "dropping cell left of the header");
            return;
        }

        let header = self.rows.first();
        if let Some(row) = self.current.as_mut() {
            fill_gap(row, header, key, self.gap_fill);
            row.cells.push(LogicalCell {
                key: key.raw.to_string(),
                column: key.column,
                cell: cell.clone(),
                synthetic: false,
            });
        }
    }

    fn finish_row(&mut self) {
        let Some(mut row) = self.current.take() else {
            return;
        };

        if self.gap_fill == GapFill::AllColumns {
            if let Some(header) = self.rows.first() {
                // A row whose cells were all dropped is padded to the full header
                let last = row.last_column();
                for column in header.cells.iter().map(|c| c.column) {
                    if last.map_or(true, |last| column > last) {
                        row.push_gap(&CellAddress::column_to_letters(column), column);
                    }
                }
            }
        }

        self.rows.push(row);
    }

    fn finish(mut self) -> LogicalTable {
        self.finish_row();
        LogicalTable { rows: self.rows }
    }
}

/// Synthesize the cells skipped between the row's last cell and `key`
fn fill_gap(
    row: &mut LogicalRow,
    header: Option<&LogicalRow>,
    key: &SheetKey<'_>,
    mode: GapFill,
) {
    let column = key.column;
    match mode {
        GapFill::None => {}
        GapFill::SingleColumn => {
            let Some(previous) = row.cells.last() else {
                return;
            };
            // Only the first letters of the two labels are compared, so `A`
            // followed by `AA` is not a gap
            if i32::from(first_letter(key.label)) - i32::from(first_letter(&previous.key)) > 1 {
                // Label comes from the header cell at the same position
                let missing = previous.column.saturating_add(1);
                let label = header
                    .and_then(|h| h.get(row.len()))
                    .map(|c| CellAddress::column_to_letters(c.column))
                    .unwrap_or_else(|| CellAddress::column_to_letters(missing));
                row.push_gap(&label, missing);
            }
        }
        GapFill::AllColumns => {
            let start = match row.last_column() {
                Some(previous) => u32::from(previous) + 1,
                // Leading gaps only exist relative to a header
                None => match header.and_then(LogicalRow::first_column) {
                    Some(first) => u32::from(first),
                    None => return,
                },
            };
            for missing in start..u32::from(column) {
                // missing < column, so it fits
                let missing = missing as u16;
                row.push_gap(&CellAddress::column_to_letters(missing), missing);
            }
        }
    }
}

fn first_letter(label: &str) -> u8 {
    label.as_bytes().first().copied().unwrap_or(b'A')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheet(entries: &[(&str, &str)]) -> Sheet {
        let mut sheet = Sheet::new("Sheet1");
        for (key, value) in entries {
            sheet.insert(*key, Cell::new(*value));
        }
        sheet
    }

    fn keys_of(row: &LogicalRow) -> Vec<&str> {
        row.cells.iter().map(|c| c.key.as_str()).collect()
    }

    #[test]
    fn test_parse_key() {
        let key = SheetKey::parse("AB12").unwrap();
        assert_eq!((key.label, key.column, key.row), ("AB", 27, 12));

        assert!(SheetKey::parse("1A").is_none());
        assert!(SheetKey::parse("a1").is_none());
        assert!(SheetKey::parse("A1B").is_none());
        assert!(SheetKey::parse("!ref").is_none());
        assert!(SheetKey::parse("A99999999999").is_none());
        assert!(SheetKey::parse("ZZZZ1").is_none());
    }

    #[test]
    fn test_ordered_keys_sorts_by_row_then_column() {
        let sheet = sheet(&[
            ("B2", "x"),
            ("AA1", "x"),
            ("A2", "x"),
            ("B1", "x"),
            ("!ref", "A1:AA2"),
            ("1A", "x"),
        ]);

        let spreadsheet: Vec<&str> = ordered_keys(&sheet, ColumnOrder::Spreadsheet)
            .iter()
            .map(|k| k.raw)
            .collect();
        assert_eq!(spreadsheet, vec!["B1", "AA1", "A2", "B2"]);

        let lexicographic: Vec<&str> = ordered_keys(&sheet, ColumnOrder::Lexicographic)
            .iter()
            .map(|k| k.raw)
            .collect();
        assert_eq!(lexicographic, vec!["AA1", "B1", "A2", "B2"]);
    }

    #[test]
    fn test_rows_are_normalized_to_start_at_zero() {
        let sheet = sheet(&[("A5", "Name"), ("A7", "Opt"), ("A6", "Bolt")]);
        let table = LogicalTable::from_sheet(&sheet, &ExtractOptions::default());

        assert_eq!(table.len(), 3);
        let numbers: Vec<u32> = table.rows().iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![5, 6, 7]);
        assert_eq!(keys_of(table.header().unwrap()), vec!["A5"]);
    }

    #[test]
    fn test_empty_sheet_yields_empty_table() {
        let sheet = sheet(&[("!ref", "A1"), ("!margins", "x"), ("bogus", "x")]);
        let table = LogicalTable::from_sheet(&sheet, &ExtractOptions::default());
        assert!(table.is_empty());
        assert!(table.header().is_none());
    }

    #[test]
    fn test_no_gap_fill() {
        let sheet = sheet(&[("A1", "Name"), ("C1", "Status"), ("C2", "OWNED")]);
        let options = ExtractOptions::default().with_gap_fill(GapFill::None);
        let table = LogicalTable::from_sheet(&sheet, &options);

        assert_eq!(keys_of(&table.rows()[0]), vec!["A1", "C1"]);
        assert_eq!(keys_of(&table.rows()[1]), vec!["C2"]);
    }

    #[test]
    fn test_single_column_fill_inserts_one_cell_per_gap() {
        let sheet = sheet(&[
            ("A1", "Name"),
            ("B1", "Set"),
            ("C1", "Foil"),
            ("D1", "Status"),
            ("A2", "Opt"),
            ("D2", "OWNED"),
        ]);
        let options = ExtractOptions::default().with_gap_fill(GapFill::SingleColumn);
        let table = LogicalTable::from_sheet(&sheet, &options);

        // Two columns were skipped but only one cell is synthesized
        let row = &table.rows()[1];
        assert_eq!(keys_of(row), vec!["A2", "B2", "D2"]);
        assert!(row.cells[1].synthetic);
        assert_eq!(row.cells[1].cell.value, CellValue::string(""));
    }

    #[test]
    fn test_single_column_fill_labels_by_header_position() {
        let sheet = sheet(&[
            ("A1", "Name"),
            ("B1", "Set"),
            ("C1", "Foil"),
            ("D1", "Status"),
            ("E1", "Notes"),
            ("F1", "Price"),
            ("A2", "Opt"),
            ("D2", "OWNED"),
            ("F2", "0.10"),
        ]);
        let options = ExtractOptions::default().with_gap_fill(GapFill::SingleColumn);
        let table = LogicalTable::from_sheet(&sheet, &options);

        // After the first gap the row is one position behind the header, so
        // the second synthetic cell borrows the label of header position 3
        assert_eq!(
            keys_of(&table.rows()[1]),
            vec!["A2", "B2", "D2", "D2", "F2"]
        );
    }

    #[test]
    fn test_all_columns_fill() {
        let sheet = sheet(&[
            ("A1", "Name"),
            ("B1", "Set"),
            ("C1", "Foil"),
            ("D1", "Status"),
            ("E1", "Notes"),
            ("A2", "Opt"),
            ("D2", "OWNED"),
            ("C3", "yes"),
        ]);
        let table = LogicalTable::from_sheet(&sheet, &ExtractOptions::default());

        assert_eq!(
            keys_of(&table.rows()[1]),
            vec!["A2", "B2", "C2", "D2", "E2"]
        );
        assert_eq!(
            keys_of(&table.rows()[2]),
            vec!["A3", "B3", "C3", "D3", "E3"]
        );
        let synthetic: Vec<bool> = table.rows()[2].cells.iter().map(|c| c.synthetic).collect();
        assert_eq!(synthetic, vec![true, true, false, true, true]);
    }

    #[test]
    fn test_single_column_fill_compares_first_letters() {
        let sheet = sheet(&[
            ("A1", "Name"),
            ("B1", "Set"),
            ("A2", "Opt"),
            ("AA2", "x"),
            ("A3", "Bolt"),
            ("C3", "x"),
        ]);
        let options = ExtractOptions::legacy();
        let table = LogicalTable::from_sheet(&sheet, &options);

        assert_eq!(keys_of(&table.rows()[1]), vec!["A2", "AA2"]);
        assert_eq!(keys_of(&table.rows()[2]), vec!["A3", "B3", "C3"]);

        // Full column indices see the 25 skipped columns
        let table = LogicalTable::from_sheet(&sheet, &ExtractOptions::default());
        assert_eq!(table.rows()[1].len(), 27);
    }

    #[test]
    fn test_all_columns_fill_drops_cells_left_of_header() {
        let sheet = sheet(&[
            ("B1", "Name"),
            ("C1", "Status"),
            ("A2", "row note"),
            ("B2", "Opt"),
            ("C2", "OWNED"),
            ("A3", "only a note"),
        ]);
        let table = LogicalTable::from_sheet(&sheet, &ExtractOptions::default());

        assert_eq!(table.len(), 3);
        assert_eq!(keys_of(&table.rows()[1]), vec!["B2", "C2"]);
        assert_eq!(keys_of(&table.rows()[2]), vec!["B3", "C3"]);
        assert!(table.rows()[2].cells.iter().all(|c| c.synthetic));

        // Other modes keep the cell
        let options = ExtractOptions::default().with_gap_fill(GapFill::None);
        let table = LogicalTable::from_sheet(&sheet, &options);
        assert_eq!(keys_of(&table.rows()[1]), vec!["A2", "B2", "C2"]);
    }

    #[test]
    fn test_all_columns_fill_does_not_pad_header() {
        let sheet = sheet(&[("B1", "Name"), ("D1", "Status")]);
        let table = LogicalTable::from_sheet(&sheet, &ExtractOptions::default());

        // Interior gaps of the header are filled, leading ones are not
        assert_eq!(keys_of(table.header().unwrap()), vec!["B1", "C1", "D1"]);
    }
}

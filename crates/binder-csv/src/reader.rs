//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;
use binder_core::{CellRange, CellValue, Sheet, Workbook, MAX_COLS, MAX_ROWS};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a one-sheet workbook
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a one-sheet workbook
    ///
    /// The sheet is named `Sheet1`. Empty fields leave no cell behind, and
    /// the used range is recorded under `!ref`.
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Workbook> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut sheet = Sheet::new("Sheet1");
        let mut used: Option<CellRange> = None;

        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result?;

            for (col_idx, field) in record.iter().enumerate() {
                if field.is_empty() {
                    continue;
                }

                let (row, col) = Self::position(row_idx, col_idx)?;
                let value = if options.auto_detect_types {
                    Self::detect_type(field)
                } else {
                    CellValue::string(field)
                };
                sheet.set_cell_value_at(row, col, value);

                let cell = CellRange::from_indices(row, col, row, col);
                used = Some(match used {
                    Some(range) => range.union(&cell),
                    None => cell,
                });
            }
        }

        if let Some(range) = used {
            sheet.set_range(range);
        }
        tracing::debug!(cells = sheet.cell_count(), "read CSV");

        let mut workbook = Workbook::empty();
        workbook.add_existing_sheet(sheet)?;
        Ok(workbook)
    }

    fn position(row: usize, col: usize) -> CsvResult<(u32, u16)> {
        let too_large = || CsvError::TooLarge { row, column: col };
        let r = u32::try_from(row).map_err(|_| too_large())?;
        let c = u16::try_from(col).map_err(|_| too_large())?;
        if r >= MAX_ROWS || c >= MAX_COLS {
            return Err(too_large());
        }
        Ok((r, c))
    }

    /// Detect the type of a field value
    ///
    /// Only `true`/`false` become booleans and only fields that look like
    /// decimal numbers become numbers; everything else keeps its exact text.
    fn detect_type(field: &str) -> CellValue {
        let trimmed = field.trim();

        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Boolean(false);
        }

        // f64 parsing also accepts "inf" and "NaN"
        let numeric = trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
        if numeric && trimmed.chars().any(|c| c.is_ascii_digit()) {
            if let Ok(n) = trimmed.parse::<f64>() {
                return CellValue::Number(n);
            }
        }

        CellValue::string(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_type() {
        assert_eq!(CsvReader::detect_type("42"), CellValue::Number(42.0));
        assert_eq!(CsvReader::detect_type(" -1.5 "), CellValue::Number(-1.5));
        assert_eq!(CsvReader::detect_type("TRUE"), CellValue::Boolean(true));
        assert_eq!(CsvReader::detect_type("false"), CellValue::Boolean(false));
        assert_eq!(CsvReader::detect_type("Infinity"), CellValue::string("Infinity"));
        assert_eq!(CsvReader::detect_type("NaN"), CellValue::string("NaN"));
        assert_eq!(CsvReader::detect_type("e"), CellValue::string("e"));
        assert_eq!(CsvReader::detect_type("1e"), CellValue::string("1e"));
        assert_eq!(CsvReader::detect_type(" Opt "), CellValue::string(" Opt "));
    }

    #[test]
    fn test_position_bounds() {
        assert_eq!(CsvReader::position(0, 0).unwrap(), (0, 0));
        assert!(CsvReader::position(MAX_ROWS as usize, 0).is_err());
        assert!(CsvReader::position(0, MAX_COLS as usize).is_err());
    }
}

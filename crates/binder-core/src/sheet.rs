//! Sparse sheet type

use ahash::AHashMap;

use crate::cell::{Cell, CellAddress, CellRange, CellValue};
use crate::error::Result;

/// Prefix marking reserved metadata keys (e.g. `!ref`)
pub const METADATA_PREFIX: char = '!';

/// Metadata key holding the sheet's used range in A1:B2 notation
pub const RANGE_KEY: &str = "!ref";

/// Whether a key names sheet metadata rather than a data cell
pub fn is_metadata_key(key: &str) -> bool {
    key.starts_with(METADATA_PREFIX)
}

/// A single worksheet stored as a sparse address -> cell mapping
///
/// Keys are kept verbatim, so a sheet can carry addresses that do not parse
/// as A1 references. Metadata entries share the key space and are recognised
/// by [`METADATA_PREFIX`]. Iteration order is unspecified.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    /// Sheet name
    name: String,
    /// Cells and metadata keyed by address
    entries: AHashMap<String, Cell>,
}

impl Sheet {
    /// Create a new, empty sheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            entries: AHashMap::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Raw entries ===

    /// Insert an entry under a raw key, returning the previous one
    pub fn insert<K: Into<String>>(&mut self, key: K, cell: Cell) -> Option<Cell> {
        self.entries.insert(key.into(), cell)
    }

    /// Get an entry by raw key
    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.entries.get(key)
    }

    /// Remove an entry by raw key
    pub fn remove(&mut self, key: &str) -> Option<Cell> {
        self.entries.remove(key)
    }

    /// Whether an entry exists under the raw key
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over all keys, metadata included
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over all entries, metadata included
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over data cells only
    pub fn cells(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.iter().filter(|(k, _)| !is_metadata_key(k))
    }

    /// Number of entries, metadata included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the sheet has no entries at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of data cells
    pub fn cell_count(&self) -> usize {
        self.cells().count()
    }

    // === Cell access ===

    /// Set a cell value by address string (e.g., "A1")
    ///
    /// The address is validated and stored in canonical upper-case form.
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value);
        Ok(())
    }

    /// Set a cell value by 0-based row and column indices
    pub fn set_cell_value_at<V: Into<CellValue>>(&mut self, row: u32, col: u16, value: V) {
        self.entries
            .insert(CellAddress::new(row, col).to_a1_string(), Cell::new(value));
    }

    /// Get a cell by 0-based row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&Cell> {
        self.entries.get(&CellAddress::new(row, col).to_a1_string())
    }

    // === Metadata ===

    /// Set a metadata entry; the prefix is added when missing
    pub fn set_metadata<S: Into<String>>(&mut self, key: &str, value: S) {
        let key = if is_metadata_key(key) {
            key.to_string()
        } else {
            format!("{}{}", METADATA_PREFIX, key)
        };
        self.entries.insert(key, Cell::new(CellValue::String(value.into())));
    }

    /// Get a metadata value as text
    pub fn metadata(&self, key: &str) -> Option<&str> {
        let cell = if is_metadata_key(key) {
            self.entries.get(key)
        } else {
            self.entries.get(&format!("{}{}", METADATA_PREFIX, key))
        };
        cell.and_then(|c| c.value.as_string())
    }

    /// Declared used range (the `!ref` entry), if present and well formed
    pub fn range(&self) -> Option<CellRange> {
        self.metadata(RANGE_KEY)
            .and_then(|r| CellRange::parse(r).ok())
    }

    /// Record the used range under `!ref`
    pub fn set_range(&mut self, range: CellRange) {
        self.set_metadata(RANGE_KEY, range.to_a1_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_metadata_shares_key_space() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.set_cell_value("A1", "Name").unwrap();
        sheet.set_range(CellRange::parse("A1:B3").unwrap());

        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.cell_count(), 1);
        assert!(sheet.contains_key("!ref"));
        assert_eq!(sheet.metadata("ref"), Some("A1:B3"));
        assert_eq!(sheet.range(), Some(CellRange::from_indices(0, 0, 2, 1)));
    }

    #[test]
    fn test_set_cell_value_canonicalises_address() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.set_cell_value("ab12", 3.0).unwrap();
        assert!(sheet.get("AB12").is_some());
        assert_eq!(sheet.cell_at(11, 27).map(|c| &c.value), Some(&CellValue::Number(3.0)));
        assert!(sheet.set_cell_value("12AB", 1.0).is_err());
    }

    #[test]
    fn test_raw_keys_are_kept_verbatim() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.insert("1A", Cell::new("odd"));
        assert_eq!(sheet.get("1A").map(|c| c.display()), Some("odd".to_string()));
        assert_eq!(sheet.cells().count(), 1);
    }
}

//! Extraction options

/// How cells missing from the middle of a row are compensated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapFill {
    /// Leave gaps alone; later cells shift left relative to the header
    None,
    /// Insert exactly one empty cell per gap, whatever its width
    ///
    /// Gaps are detected from the first letter of the column labels only, so
    /// `A` followed by `AA` is not a gap. Rows with a gap wider than one
    /// column stay misaligned after it. Kept for imports that were validated
    /// against the historical behavior.
    SingleColumn,
    /// Insert an empty cell for every skipped column, including columns
    /// missing before the row's first cell and after its last one (up to the
    /// header's extent). Cells left of the header's first column are dropped.
    #[default]
    AllColumns,
}

/// Ordering of cells that share a row number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnOrder {
    /// Spreadsheet order: `Z` < `AA`
    #[default]
    Spreadsheet,
    /// Plain string comparison of column labels: `AA` < `Z`
    Lexicographic,
}

/// Options controlling table recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractOptions {
    /// Gap compensation strategy
    pub gap_fill: GapFill,
    /// Column ordering within a row
    pub column_order: ColumnOrder,
}

impl ExtractOptions {
    /// Behavior of the historical importer: one synthetic cell per gap and
    /// label-string column ordering
    pub fn legacy() -> Self {
        Self {
            gap_fill: GapFill::SingleColumn,
            column_order: ColumnOrder::Lexicographic,
        }
    }

    /// Set the gap compensation strategy
    pub fn with_gap_fill(mut self, gap_fill: GapFill) -> Self {
        self.gap_fill = gap_fill;
        self
    }

    /// Set the column ordering
    pub fn with_column_order(mut self, column_order: ColumnOrder) -> Self {
        self.column_order = column_order;
        self
    }
}

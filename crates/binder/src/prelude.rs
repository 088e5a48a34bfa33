//! Prelude module - common imports for binder users
//!
//! ```rust
//! use binder::prelude::*;
//! ```

pub use crate::{
    load_records,
    process_file,
    // Catalog
    CardCache,
    CardRecord,
    CatalogClient,
    CellAddress,
    CellValue,
    ClientConfig,
    // Statistics
    CollectionStats,
    EnrichedCard,
    // Error types
    Error,
    // Extraction
    ExtractOptions,
    FetchPipeline,
    HttpCatalogClient,
    JsonFileCache,
    MemoryCache,
    Result,
    Sheet,
    Status,
    // Main types
    Workbook,
    // Extension traits
    WorkbookExt,
};

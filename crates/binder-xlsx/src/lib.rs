//! # binder-xlsx
//!
//! XLSX (Office Open XML) reader for binder.
//!
//! Only cell contents are read: each worksheet becomes a sparse
//! [`binder_core::Sheet`] keyed by the cells' own `r` references, with the
//! declared `<dimension>` recorded under `!ref`. Styles, comments and
//! formulas other than their cached results are skipped.

pub mod error;
pub mod reader;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;

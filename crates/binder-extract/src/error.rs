//! Error types for binder-extract
//!
//! Extraction itself never fails; the only fallible operation is parsing a
//! [`Status`](crate::Status) from text outside the extractor.

use thiserror::Error;

/// A status string that is not one of the known spellings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status '{0}'")]
pub struct ParseStatusError(pub String);

//! Card records and ownership status

use std::fmt;
use std::str::FromStr;

use crate::error::ParseStatusError;

/// Ownership status of a card in the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// Not applicable (the card is tracked but ownership is irrelevant)
    #[cfg_attr(feature = "serde", serde(rename = "N_A"))]
    NotApplicable,
    /// Not owned
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "NOT_OWNED"))]
    NotOwned,
    /// Owned
    #[cfg_attr(feature = "serde", serde(rename = "OWNED"))]
    Owned,
    /// Ownership unknown
    #[cfg_attr(feature = "serde", serde(rename = "UNCERTAIN"))]
    Uncertain,
}

impl Status {
    /// Every status, in display order
    pub const ALL: [Status; 4] = [
        Status::NotApplicable,
        Status::NotOwned,
        Status::Owned,
        Status::Uncertain,
    ];

    /// Spreadsheet spelling of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NotApplicable => "N_A",
            Status::NotOwned => "NOT_OWNED",
            Status::Owned => "OWNED",
            Status::Uncertain => "UNCERTAIN",
        }
    }

    /// Parse the spreadsheet spelling (exact, case-sensitive)
    ///
    /// ```
    /// use binder_extract::Status;
    ///
    /// assert_eq!(Status::parse("OWNED"), Some(Status::Owned));
    /// assert_eq!(Status::parse("owned"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "N_A" => Some(Status::NotApplicable),
            "NOT_OWNED" => Some(Status::NotOwned),
            "OWNED" => Some(Status::Owned),
            "UNCERTAIN" => Some(Status::Uncertain),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::parse(s).ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// One inventory line recovered from a sheet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardRecord {
    /// Exact card name, used as the catalog lookup and cache key
    pub name: String,
    /// Ownership status
    pub status: Status,
}

impl CardRecord {
    /// Create a record
    pub fn new<S: Into<String>>(name: S, status: Status) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

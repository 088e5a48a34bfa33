//! Deserialization of JSON workbook dumps
//!
//! The accepted shape is the one produced by browser-side spreadsheet
//! tooling when a parsed workbook is serialized as-is:
//!
//! ```json
//! {
//!   "SheetNames": ["Cards"],
//!   "Sheets": {
//!     "Cards": {
//!       "!ref": "A1:B2",
//!       "A1": { "t": "s", "v": "Name", "w": "Name" },
//!       "B1": { "t": "s", "v": "Status" },
//!       "A2": { "t": "s", "v": "Opt" },
//!       "B2": { "t": "s", "v": "OWNED" }
//!     }
//!   }
//! }
//! ```
//!
//! Only `!ref` is kept among the metadata entries.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;

use crate::cell::{Cell, CellError, CellType, CellValue};
use crate::sheet::{is_metadata_key, Sheet, RANGE_KEY};
use crate::workbook::Workbook;

#[derive(Deserialize)]
struct RawWorkbook {
    #[serde(rename = "SheetNames")]
    sheet_names: Vec<String>,
    #[serde(rename = "Sheets", default)]
    sheets: HashMap<String, RawSheet>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
struct RawCell {
    t: Option<String>,
    v: Option<RawValue>,
    w: Option<String>,
}

impl RawCell {
    fn into_cell(self) -> Cell {
        let tag = self.t.as_deref().and_then(CellType::from_code);
        let value = match (tag, self.v) {
            (_, None) | (Some(CellType::Stub), _) => CellValue::Empty,
            (Some(CellType::Error), Some(RawValue::Number(code))) => {
                let error = CellError::from_code(code as u8)
                    .or_else(|| self.w.as_deref().and_then(CellError::from_str))
                    .unwrap_or(CellError::Na);
                CellValue::Error(error)
            }
            (Some(CellType::Error), Some(RawValue::Text(text))) => {
                CellValue::Error(CellError::from_str(&text).unwrap_or(CellError::Na))
            }
            (Some(CellType::Date), Some(RawValue::Text(text))) => CellValue::Date(text),
            (_, Some(RawValue::Bool(b))) => CellValue::Boolean(b),
            (_, Some(RawValue::Number(n))) => CellValue::Number(n),
            (_, Some(RawValue::Text(text))) => CellValue::String(text),
        };

        Cell {
            value,
            formatted: self.w,
        }
    }
}

struct RawSheet(Sheet);

impl<'de> Deserialize<'de> for RawSheet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SheetVisitor;

        impl<'de> Visitor<'de> for SheetVisitor {
            type Value = RawSheet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of cell addresses to cell objects")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawSheet, A::Error> {
                // The name is filled in by the workbook once the key is known
                let mut sheet = Sheet::new("");
                while let Some(key) = map.next_key::<String>()? {
                    if key == RANGE_KEY {
                        let range: String = map.next_value()?;
                        sheet.set_metadata(RANGE_KEY, range);
                    } else if is_metadata_key(&key) {
                        map.next_value::<IgnoredAny>()?;
                    } else {
                        let cell: RawCell = map.next_value()?;
                        sheet.insert(key, cell.into_cell());
                    }
                }
                Ok(RawSheet(sheet))
            }
        }

        deserializer.deserialize_map(SheetVisitor)
    }
}

impl<'de> Deserialize<'de> for Workbook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = RawWorkbook::deserialize(deserializer)?;
        let mut workbook = Workbook::empty();

        for name in raw.sheet_names {
            let RawSheet(mut sheet) = raw.sheets.remove(&name).ok_or_else(|| {
                <D::Error as de::Error>::custom(format!(
                    "sheet '{}' is listed but has no contents",
                    name
                ))
            })?;
            sheet.set_name(name);
            workbook
                .add_existing_sheet(sheet)
                .map_err(<D::Error as de::Error>::custom)?;
        }

        Ok(workbook)
    }
}

//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use binder_core::{Cell, CellError, CellValue, Sheet, Workbook, RANGE_KEY};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '_' {
            result.push(c);
            continue;
        }

        let mut hex = String::new();
        let mut consumed_x = false;
        let mut closed = false;
        let mut decoded = None;

        if chars.peek() == Some(&'x') {
            chars.next();
            consumed_x = true;
            while hex.len() < 4 {
                match chars.peek() {
                    Some(&ch) if ch.is_ascii_hexdigit() => {
                        hex.push(ch);
                        chars.next();
                    }
                    _ => break,
                }
            }

            if hex.len() == 4 && chars.peek() == Some(&'_') {
                chars.next();
                closed = true;
                decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
            }
        }

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                // Not an escape: give back what was consumed
                result.push('_');
                if consumed_x {
                    result.push('x');
                    result.push_str(&hex);
                }
                if closed {
                    result.push('_');
                }
            }
        }
    }

    result
}

/// Attribute value by name, unescaped
fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Raw parts of a `<c>` element, gathered while streaming
#[derive(Debug, Default)]
struct PendingCell {
    reference: Option<String>,
    cell_type: Option<String>,
    value: Option<String>,
    has_formula: bool,
    inline: Option<String>,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();

        for (name, r_id) in &sheet_info {
            match sheet_paths.get(r_id) {
                Some(path) => {
                    let sheet = Self::read_worksheet(&mut archive, path, name, &shared_strings)?;
                    tracing::debug!(
                        sheet = name.as_str(),
                        cells = sheet.cell_count(),
                        "read worksheet"
                    );
                    workbook.add_existing_sheet(sheet)?;
                }
                None => {
                    tracing::warn!(
                        sheet = name.as_str(),
                        r_id = r_id.as_str(),
                        "sheet has no worksheet relationship, skipping"
                    );
                }
            }
        }

        // Ensure at least one sheet exists
        if workbook.is_empty() {
            workbook.add_sheet("Sheet1")?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs repeat the text in another script
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current));
                        current.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current.push_str(&e.unescape()?);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    if let (Some(name), Some(r_id)) = (attr(&e, b"name"), attr(&e, b"r:id")) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr(&e, b"Id");
                    let target = attr(&e, b"Target");
                    let rel_type = attr(&e, b"Type");

                    // Only include worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read one worksheet part into a sparse sheet
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        name: &str,
        shared_strings: &[String],
    ) -> XlsxResult<Sheet> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        let mut sheet = Sheet::new(name);

        let mut buf = Vec::new();
        let mut pending: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"c" => {
                        pending = Some(PendingCell {
                            reference: attr(&e, b"r"),
                            cell_type: attr(&e, b"t"),
                            ..PendingCell::default()
                        });
                    }
                    b"v" if pending.is_some() => in_value = true,
                    b"f" => {
                        if let Some(cell) = pending.as_mut() {
                            cell.has_formula = true;
                        }
                    }
                    b"is" if pending.is_some() => in_inline_str = true,
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"dimension" => {
                        if let Some(range) = attr(&e, b"ref") {
                            sheet.set_metadata(RANGE_KEY, range);
                        }
                    }
                    b"f" => {
                        if let Some(cell) = pending.as_mut() {
                            cell.has_formula = true;
                        }
                    }
                    // A self-closing <c/> carries no value
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(cell) = pending.take() {
                            Self::process_cell(&mut sheet, cell, shared_strings)?;
                        }
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline_str = false,
                    b"t" if in_inline_str => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value || in_inline_text => {
                    let text = e.unescape()?;
                    if let Some(cell) = pending.as_mut() {
                        if in_value {
                            cell.value.get_or_insert_with(String::new).push_str(&text);
                        } else {
                            cell.inline.get_or_insert_with(String::new).push_str(&text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }

    /// Decode a finished cell and store it under its own reference
    fn process_cell(
        sheet: &mut Sheet,
        cell: PendingCell,
        shared_strings: &[String],
    ) -> XlsxResult<()> {
        let Some(reference) = cell.reference else {
            tracing::warn!(sheet = sheet.name(), "cell without a reference, skipping");
            return Ok(());
        };

        let value = if let Some(text) = cell.inline {
            Some(CellValue::String(decode_excel_escapes(&text)))
        } else if let Some(raw) = cell.value.as_deref() {
            if cell.has_formula {
                Self::cached_value(cell.cell_type.as_deref(), raw, shared_strings)
            } else {
                Some(Self::typed_value(cell.cell_type.as_deref(), raw, shared_strings)?)
            }
        } else {
            None
        };

        if let Some(value) = value {
            sheet.insert(reference, Cell::new(value));
        }

        Ok(())
    }

    /// Interpret a `<v>` element according to the cell type
    fn typed_value(
        cell_type: Option<&str>,
        value: &str,
        shared_strings: &[String],
    ) -> XlsxResult<CellValue> {
        let cell_value = match cell_type {
            // Shared string
            Some("s") => {
                let idx: usize = value.parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::String(s.clone())
            }

            // Boolean
            Some("b") => CellValue::Boolean(value == "1" || value.eq_ignore_ascii_case("true")),

            // Error
            Some("e") => CellError::from_str(value)
                .map(CellValue::Error)
                .unwrap_or_else(|| CellValue::String(value.to_string())),

            // Explicit string - decode Excel escape sequences
            Some("str") | Some("inlineStr") => CellValue::String(decode_excel_escapes(value)),

            // ISO 8601 date
            Some("d") => CellValue::Date(value.to_string()),

            // Number (default type or explicit "n")
            None | Some("n") => match value.parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::String(value.to_string()),
            },

            // Unknown type - treat as string
            Some(_) => CellValue::String(value.to_string()),
        };

        Ok(cell_value)
    }

    /// Cached result of a formula cell; unreadable results are dropped
    fn cached_value(
        cell_type: Option<&str>,
        value: &str,
        shared_strings: &[String],
    ) -> Option<CellValue> {
        match cell_type {
            Some("s") => {
                let idx: usize = value.parse().ok()?;
                shared_strings.get(idx).map(|s| CellValue::String(s.clone()))
            }
            _ => Self::typed_value(cell_type, value, shared_strings).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_excel_escapes_control_characters() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
        assert_eq!(decode_excel_escapes("hello_x000a_world"), "hello\nworld");
        assert_eq!(decode_excel_escapes("col1_x0009_col2"), "col1\tcol2");
        assert_eq!(
            decode_excel_escapes("line1_x000d__x000a_line2"),
            "line1\r\nline2"
        );
    }

    #[test]
    fn test_decode_excel_escapes_underscore() {
        // _x005f_ is an escaped underscore
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
        assert_eq!(decode_excel_escapes("Fire_Ice"), "Fire_Ice");
    }

    #[test]
    fn test_decode_excel_escapes_no_escapes() {
        assert_eq!(
            decode_excel_escapes("Jace, the Mind Sculptor"),
            "Jace, the Mind Sculptor"
        );
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("_xZZ_"), "_xZZ_");
    }

    #[test]
    fn test_decode_excel_escapes_uppercase() {
        assert_eq!(decode_excel_escapes("_x000D_"), "\r");
        assert_eq!(decode_excel_escapes("_x000A_"), "\n");
    }

    #[test]
    fn test_typed_values() {
        let strings = vec!["Opt".to_string()];
        let value = |t: Option<&str>, v: &str| XlsxReader::typed_value(t, v, &strings).unwrap();

        assert_eq!(value(Some("s"), "0"), CellValue::string("Opt"));
        assert_eq!(value(Some("b"), "1"), CellValue::Boolean(true));
        assert_eq!(value(Some("e"), "#N/A"), CellValue::Error(CellError::Na));
        assert_eq!(value(None, "4"), CellValue::Number(4.0));
        assert_eq!(value(Some("n"), "x"), CellValue::string("x"));
        assert_eq!(value(Some("d"), "2018-07-13"), CellValue::Date("2018-07-13".into()));

        assert!(XlsxReader::typed_value(Some("s"), "7", &strings).is_err());
        assert!(XlsxReader::typed_value(Some("s"), "x", &strings).is_err());
    }

    #[test]
    fn test_cached_values_are_lenient() {
        let strings = vec!["Opt".to_string()];
        assert_eq!(
            XlsxReader::cached_value(Some("str"), "Bolt", &strings),
            Some(CellValue::string("Bolt"))
        );
        assert_eq!(XlsxReader::cached_value(Some("s"), "9", &strings), None);
    }
}

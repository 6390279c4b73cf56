//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use fieldcheck_core::{CellRef, CellValue, RawGrid};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '_' {
            result.push(c);
            continue;
        }

        let mut hex_chars = String::new();
        let mut saw_x = false;
        let mut decoded = None;

        if chars.peek() == Some(&'x') {
            chars.next();
            saw_x = true;

            while hex_chars.len() < 4 {
                match chars.peek() {
                    Some(&ch) if ch.is_ascii_hexdigit() => {
                        hex_chars.push(ch);
                        chars.next();
                    }
                    _ => break,
                }
            }

            if hex_chars.len() == 4 && chars.peek() == Some(&'_') {
                chars.next();
                decoded = u32::from_str_radix(&hex_chars, 16)
                    .ok()
                    .and_then(char::from_u32);
            }
        }

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                // Not a valid escape sequence, output what we consumed
                result.push('_');
                if saw_x {
                    result.push('x');
                }
                result.push_str(&hex_chars);
            }
        }
    }

    result
}

/// Sheet entry from `xl/workbook.xml`
#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    r_id: String,
}

/// Workbook-level facts needed to decode a sheet
#[derive(Debug, Default)]
struct WorkbookInfo {
    sheets: Vec<SheetEntry>,
    date_1904: bool,
}

/// Attribute value as an owned string, if present and decodable
fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|s| s.to_string()))
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read the first worksheet of a file into a grid
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<RawGrid> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read the first worksheet into a grid
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<RawGrid> {
        Self::read_sheet(reader, 0)
    }

    /// Read the worksheet at `index` (0-based, workbook order) into a grid
    pub fn read_sheet<R: Read + Seek>(reader: R, index: usize) -> XlsxResult<RawGrid> {
        let mut archive = Self::open_archive(reader)?;

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let entry = info.sheets.get(index).ok_or(XlsxError::SheetNotFound {
            index,
            count: info.sheets.len(),
        })?;
        let path = sheet_paths.get(&entry.r_id).ok_or_else(|| {
            XlsxError::MissingPart(format!(
                "relationship {} for sheet '{}'",
                entry.r_id, entry.name
            ))
        })?;

        let grid = Self::read_worksheet(&mut archive, path, &shared_strings)?;
        log::debug!(
            "decoded sheet '{}' ({} rows, date1904={})",
            entry.name,
            grid.len(),
            info.date_1904
        );

        Ok(grid.with_date_1904(info.date_1904))
    }

    /// List sheet names in workbook order
    pub fn sheet_names<R: Read + Seek>(reader: R) -> XlsxResult<Vec<String>> {
        let mut archive = Self::open_archive(reader)?;
        let info = Self::read_workbook_xml(&mut archive)?;
        Ok(info.sheets.into_iter().map(|s| s.name).collect())
    }

    fn open_archive<R: Read + Seek>(reader: R) -> XlsxResult<zip::ZipArchive<R>> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        Ok(archive)
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
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs repeat the text as a reading guide; skip them
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
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
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current_string.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names, rIds and the date system
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<WorkbookInfo> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut info = WorkbookInfo::default();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"sheet" => {
                        if let (Some(name), Some(r_id)) =
                            (attr_value(&e, b"name"), attr_value(&e, b"r:id"))
                        {
                            info.sheets.push(SheetEntry { name, r_id });
                        }
                    }
                    b"workbookPr" => {
                        info.date_1904 = attr_value(&e, b"date1904")
                            .map_or(false, |v| v == "1" || v.eq_ignore_ascii_case("true"));
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(info)
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
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    // Only include worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder unless absolute
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

    /// Read a worksheet's cell values from the archive
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        shared_strings: &[String],
    ) -> XlsxResult<RawGrid> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut grid = RawGrid::new();

        // Position tracking for cells written without an `r` attribute
        let mut current_row: u32 = 0;
        let mut next_col: u16 = 0;

        // Current cell state
        let mut current_ref: Option<CellRef> = None;
        let mut current_type: Option<String> = None;
        let mut current_value = String::new();
        let mut has_value = false;
        let mut in_value = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => {
                        if let Some(r) = attr_value(&e, b"r").and_then(|s| s.parse::<u32>().ok())
                        {
                            current_row = r.saturating_sub(1); // 1-based to 0-based
                        }
                        next_col = 0;
                    }
                    b"c" => {
                        let at = match attr_value(&e, b"r") {
                            Some(r) => CellRef::parse(&r).map_err(|err| {
                                XlsxError::Parse(format!("Invalid cell reference '{}': {}", r, err))
                            })?,
                            None => CellRef::new(current_row, next_col),
                        };
                        current_row = at.row;
                        next_col = at.col.saturating_add(1);
                        current_ref = Some(at);
                        current_type = attr_value(&e, b"t");
                        current_value.clear();
                        has_value = false;
                    }
                    b"v" if current_ref.is_some() => in_value = true,
                    b"t" if current_ref.is_some() => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    // Styled but valueless cell; only advances the column
                    b"c" => {
                        if let Some(r) = attr_value(&e, b"r") {
                            if let Ok(at) = CellRef::parse(&r) {
                                current_row = at.row;
                                next_col = at.col.saturating_add(1);
                            }
                        } else {
                            next_col = next_col.saturating_add(1);
                        }
                    }
                    b"row" => {
                        if let Some(r) = attr_value(&e, b"r").and_then(|s| s.parse::<u32>().ok())
                        {
                            current_row = r;
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value || in_inline_text => {
                    if let Ok(text) = e.unescape() {
                        current_value.push_str(&text);
                        has_value = true;
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"v" => in_value = false,
                    b"t" => in_inline_text = false,
                    b"c" => {
                        if let Some(at) = current_ref.take() {
                            if has_value {
                                let value = Self::process_cell(
                                    current_type.as_deref(),
                                    &current_value,
                                    shared_strings,
                                )?;
                                grid.set(at, value);
                            }
                        }
                    }
                    b"row" => current_row = current_row.saturating_add(1),
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(grid)
    }

    /// Convert a cell's raw `<v>` text into a grid value
    fn process_cell(
        cell_type: Option<&str>,
        value: &str,
        shared_strings: &[String],
    ) -> XlsxResult<CellValue> {
        let cell_value = match cell_type {
            // Shared string
            Some("s") => {
                let idx: usize = value.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::text(s.as_str())
            }

            // Boolean
            Some("b") => {
                let truthy = value == "1" || value.eq_ignore_ascii_case("true");
                CellValue::text(if truthy { "TRUE" } else { "FALSE" })
            }

            // Inline or formula string - decode Excel escape sequences
            Some("inlineStr") | Some("str") => CellValue::Text(decode_excel_escapes(value)),

            // Number (default type or explicit "n")
            None | Some("n") => match value.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => {
                    log::warn!("non-numeric value '{}' in numeric cell, kept as text", value);
                    CellValue::text(value)
                }
            },

            // Error codes ("e"), ISO dates ("d") and unknown types stay as text
            Some(_) => CellValue::text(value),
        };

        Ok(cell_value)
    }
}

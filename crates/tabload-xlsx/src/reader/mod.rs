//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tabload_core::date::serial_to_text;
use tabload_core::{CellValue, Sheet, SheetSelector};

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{read_styles_xml, DateStyles};

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
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];

        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(ch) => {
                result.push(ch);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);

    result
}

/// Convert an `A1`-style reference to 0-based (row, column)
fn parse_cell_ref(cell_ref: &str) -> Option<(usize, usize)> {
    let split = cell_ref.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell_ref.split_at(split);
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }

    let mut col = 0usize;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }

    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}

/// Worksheet entry from `xl/workbook.xml`
#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    r_id: String,
}

/// `xl/workbook.xml` contents the reader needs
#[derive(Debug, Default)]
struct WorkbookInfo {
    sheets: Vec<SheetEntry>,
    date_1904: bool,
}

/// Shared lookup state for reading worksheet cells
struct CellContext<'a> {
    shared_strings: &'a [String],
    date_styles: &'a DateStyles,
    date_1904: bool,
}

/// Cell whose `<c>` element is still open
struct PendingCell {
    row: usize,
    col: usize,
    cell_type: Option<String>,
    style: Option<u32>,
    value: Option<String>,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// List worksheet names in workbook order
    pub fn sheet_names<R: Read + Seek>(reader: R) -> XlsxResult<Vec<String>> {
        let mut archive = Self::open_archive(reader)?;
        let info = Self::read_workbook_xml(&mut archive)?;
        Ok(info.sheets.into_iter().map(|s| s.name).collect())
    }

    /// Read one worksheet from a file path
    pub fn read_file<P: AsRef<Path>>(path: P, selector: &SheetSelector) -> XlsxResult<Sheet> {
        let file = File::open(path)?;
        Self::read_sheet(BufReader::new(file), selector)
    }

    /// Read one worksheet's cell values
    pub fn read_sheet<R: Read + Seek>(reader: R, selector: &SheetSelector) -> XlsxResult<Sheet> {
        let mut archive = Self::open_archive(reader)?;

        // Read workbook.xml to get sheet info
        let info = Self::read_workbook_xml(&mut archive)?;
        if info.sheets.is_empty() {
            return Err(XlsxError::NoWorksheets);
        }

        let names: Vec<&str> = info.sheets.iter().map(|s| s.name.as_str()).collect();
        let index = selector
            .resolve(&names)
            .ok_or_else(|| XlsxError::SheetNotFound(selector.to_string()))?;
        let entry = &info.sheets[index];

        // Read workbook.xml.rels to get sheet paths
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;
        let path = sheet_paths.get(&entry.r_id).cloned().ok_or_else(|| {
            XlsxError::MissingPart(format!("worksheet relationship {}", entry.r_id))
        })?;

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let date_styles = Self::read_styles(&mut archive)?;

        let ctx = CellContext {
            shared_strings: &shared_strings,
            date_styles: &date_styles,
            date_1904: info.date_1904,
        };
        Self::read_worksheet(&mut archive, &path, &entry.name, &ctx)
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

        // Whitespace inside <t> is significant, so no trimming here
        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
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

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<DateStyles> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file),
            Err(_) => Ok(DateStyles::default()),
        }
    }

    /// Read workbook.xml to get sheet names, rIds and the date system
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<WorkbookInfo> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut info = WorkbookInfo::default();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"sheet" => {
                        let mut name = None;
                        let mut r_id = None;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"name" => {
                                    name = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"r:id" => {
                                    r_id = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                _ => {}
                            }
                        }

                        match (name, r_id) {
                            (Some(name), Some(r_id)) => info.sheets.push(SheetEntry { name, r_id }),
                            (name, _) => {
                                log::warn!("Skipping sheet entry without name or r:id: {:?}", name)
                            }
                        }
                    }
                    b"workbookPr" => {
                        info.date_1904 = bool_attr(&e, b"date1904");
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

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => {
                                id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Type" => {
                                rel_type = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

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

    /// Read a worksheet's cells into a grid
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        name: &str,
        ctx: &CellContext<'_>,
    ) -> XlsxResult<Sheet> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);

        let mut sheet = Sheet::new(name);
        let mut buf = Vec::new();

        // Rows and cells may omit their `r` attribute; track positions
        let mut row_idx = 0usize;
        let mut next_row = 0usize;
        let mut next_col = 0usize;

        let mut current: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"row" => {
                        row_idx = row_number(&e).unwrap_or(next_row);
                        next_row = row_idx + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        current = Some(Self::start_cell(&e, row_idx, &mut next_col));
                    }
                    b"v" if current.is_some() => in_value = true,
                    b"is" if current.is_some() => in_inline_str = true,
                    b"rPh" if in_inline_str => in_phonetic = true,
                    b"t" if in_inline_str && !in_phonetic => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"row" => {
                        row_idx = row_number(&e).unwrap_or(next_row);
                        next_row = row_idx + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        // Styled but valueless cell
                        Self::start_cell(&e, row_idx, &mut next_col);
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"c" => {
                        if let Some(cell) = current.take() {
                            if let Some(raw) = cell.value.as_deref() {
                                let value = Self::cell_value(
                                    cell.cell_type.as_deref(),
                                    raw,
                                    cell.style,
                                    ctx,
                                )?;
                                sheet.set(cell.row, cell.col, value);
                            }
                        }
                        in_value = false;
                        in_inline_str = false;
                        in_inline_text = false;
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline_str = false,
                    b"rPh" => in_phonetic = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value || in_inline_text => {
                    if let (Some(cell), Ok(text)) = (current.as_mut(), e.unescape()) {
                        cell.value.get_or_insert_with(String::new).push_str(&text);
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

    fn start_cell(e: &BytesStart, row_idx: usize, next_col: &mut usize) -> PendingCell {
        let mut position = None;
        let mut cell_type = None;
        let mut style = None;

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    position = attr.unescape_value().ok().and_then(|s| {
                        let parsed = parse_cell_ref(&s);
                        if parsed.is_none() {
                            log::warn!("Invalid cell reference '{}'", s);
                        }
                        parsed
                    });
                }
                b"t" => {
                    cell_type = attr.unescape_value().ok().map(|s| s.to_string());
                }
                b"s" => {
                    style = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok());
                }
                _ => {}
            }
        }

        let (row, col) = position.unwrap_or((row_idx, *next_col));
        *next_col = col + 1;

        PendingCell {
            row,
            col,
            cell_type,
            style,
            value: None,
        }
    }

    /// Turn a cell's raw `<v>`/inline text into a value based on its type
    fn cell_value(
        cell_type: Option<&str>,
        raw: &str,
        style: Option<u32>,
        ctx: &CellContext<'_>,
    ) -> XlsxResult<CellValue> {
        let value = match cell_type {
            // Shared string
            Some("s") => {
                let idx: usize = raw.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", raw))
                })?;
                let s = ctx.shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::text(s)
            }

            // Boolean
            Some("b") => CellValue::Boolean(raw == "1" || raw.eq_ignore_ascii_case("true")),

            // Error, kept as its display text (#N/A, #DIV/0!, ...)
            Some("e") => CellValue::text(raw),

            // Inline string or formula string result - decode Excel escape sequences
            Some("inlineStr") | Some("str") => CellValue::text(decode_excel_escapes(raw)),

            // ISO 8601 date cell
            Some("d") => CellValue::text(raw),

            // Number (default type or explicit "n")
            None | Some("n") => match raw.trim().parse::<f64>() {
                Ok(n) if ctx.date_styles.is_date(style) => {
                    match serial_to_text(n, ctx.date_1904) {
                        Some(text) => CellValue::string(text),
                        None => CellValue::Number(n),
                    }
                }
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::text(raw),
            },

            // Unknown type - treat as string
            Some(other) => {
                log::warn!("Unknown cell type '{}', reading as text", other);
                CellValue::text(raw)
            }
        };

        Ok(value)
    }
}

fn row_number(e: &BytesStart) -> Option<usize> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"r")
        .and_then(|attr| attr.unescape_value().ok().and_then(|s| s.parse::<usize>().ok()))
        .and_then(|r| r.checked_sub(1))
}

fn bool_attr(e: &BytesStart, key: &[u8]) -> bool {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|s| s == "1" || s == "true"))
        .unwrap_or(false)
}

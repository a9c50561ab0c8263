//! XLS (BIFF8) reader.
//!
//! Opens a Compound File Binary (CFB/OLE2) container, reads the `Workbook`
//! stream, parses BIFF8 records, and fills a [`Sheet`] grid with the values
//! of one worksheet.

use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tabload_core::date::serial_to_text;
use tabload_core::{CellValue, Sheet, SheetSelector};

use crate::biff::parser::RecordCursor;
use crate::biff::records;
use crate::biff::strings::{parse_sst, read_short_string, read_unicode_string};
use crate::biff::{self, BiffRecord};
use crate::error::{XlsError, XlsResult};
use crate::formats::DateFormats;

/// XLS file reader.
pub struct XlsReader;

/// Metadata for a sheet parsed from the BOUNDSHEET record.
#[derive(Debug)]
struct SheetInfo {
    /// Absolute byte offset of the sheet's BOF in the Workbook stream.
    offset: u32,
    /// Sheet type: 0 = worksheet, 2 = chart, 6 = macro/VBA.
    sheet_type: u8,
    name: String,
}

/// Everything the workbook globals substream contributes
#[derive(Debug, Default)]
struct Globals {
    sst: Vec<String>,
    sheets: Vec<SheetInfo>,
    date_1904: bool,
    formats: DateFormats,
    /// Index of the globals EOF record
    end: usize,
}

impl Globals {
    fn worksheets(&self) -> impl Iterator<Item = (usize, &SheetInfo)> + '_ {
        self.sheets
            .iter()
            .enumerate()
            .filter(|(_, s)| s.sheet_type == records::SHEET_TYPE_WORKSHEET)
    }
}

impl XlsReader {
    /// Read one worksheet from a filesystem path.
    pub fn read_file<P: AsRef<Path>>(path: P, selector: &SheetSelector) -> XlsResult<Sheet> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read_sheet(BufReader::new(file), selector)
    }

    /// List worksheet names in workbook order (charts and macro sheets are
    /// left out).
    pub fn sheet_names<R: Read + Seek>(reader: R) -> XlsResult<Vec<String>> {
        let stream = Self::read_workbook_stream(reader)?;
        let all_records = biff::read_all_records(&stream);
        let globals = Self::parse_globals(&all_records)?;
        Ok(globals.worksheets().map(|(_, s)| s.name.clone()).collect())
    }

    /// Read one worksheet's cell values.
    pub fn read_sheet<R: Read + Seek>(reader: R, selector: &SheetSelector) -> XlsResult<Sheet> {
        let stream = Self::read_workbook_stream(reader)?;
        let all_records = biff::read_all_records(&stream);
        let globals = Self::parse_globals(&all_records)?;

        let worksheets: Vec<(usize, &SheetInfo)> = globals.worksheets().collect();
        if worksheets.is_empty() {
            return Err(XlsError::NoWorksheets);
        }

        let names: Vec<&str> = worksheets.iter().map(|(_, s)| s.name.as_str()).collect();
        let (biff_idx, info) = selector
            .resolve(&names)
            .map(|i| worksheets[i])
            .ok_or_else(|| XlsError::SheetNotFound(selector.to_string()))?;

        let start = Self::find_substream(&all_records, &globals, biff_idx, info)?;
        let sheet_records = Self::substream_records(&all_records[start + 1..]);

        let mut sheet = Sheet::new(info.name.clone());
        Self::parse_sheet_records(&sheet_records, &mut sheet, &globals)?;
        Ok(sheet)
    }

    fn read_workbook_stream<R: Read + Seek>(reader: R) -> XlsResult<Vec<u8>> {
        // Open CFB container
        let mut cfb = cfb::CompoundFile::open(reader)?;

        // "Book" is the BIFF5 name; its globals BOF is rejected below
        let stream_path = if cfb.exists("/Workbook") {
            "/Workbook"
        } else if cfb.exists("/Book") {
            "/Book"
        } else {
            return Err(XlsError::InvalidFormat(
                "no Workbook or Book stream found in CFB".into(),
            ));
        };

        let mut stream_data = Vec::new();
        cfb.open_stream(stream_path)?
            .read_to_end(&mut stream_data)?;
        Ok(stream_data)
    }

    /// Parse records up to the globals EOF
    fn parse_globals(all_records: &[BiffRecord]) -> XlsResult<Globals> {
        let mut globals = Globals::default();
        let mut in_globals = false;

        for (idx, rec) in all_records.iter().enumerate() {
            match rec.record_type {
                records::BOF if !in_globals => {
                    let (version, dt) = biff::parse_bof(&rec.data)?;
                    if dt != records::BOF_WORKBOOK_GLOBALS {
                        continue;
                    }
                    if version != records::BIFF8_VERSION {
                        return Err(XlsError::UnsupportedVersion(format!(
                            "expected BIFF8 (0x0600), got 0x{version:04X}"
                        )));
                    }
                    in_globals = true;
                }
                records::EOF if in_globals => {
                    globals.end = idx;
                    return Ok(globals);
                }
                records::SST if in_globals => {
                    globals.sst = parse_sst(&rec.data, &rec.continuations)?;
                }
                records::BOUNDSHEET if in_globals => {
                    globals.sheets.push(Self::parse_boundsheet(&rec.data)?);
                }
                records::DATEMODE if in_globals => {
                    let mut cur = RecordCursor::new(&rec.data);
                    globals.date_1904 = cur.u16().map(|mode| mode == 1).unwrap_or(false);
                }
                records::FORMAT if in_globals => {
                    if let Err(e) = globals.formats.add_format(&rec.data) {
                        log::warn!("Skipping malformed FORMAT record: {}", e);
                    }
                }
                records::XF if in_globals => {
                    if let Err(e) = globals.formats.add_xf(&rec.data) {
                        log::warn!("Skipping malformed XF record: {}", e);
                    }
                }
                _ => {}
            }
        }

        Err(XlsError::InvalidFormat(if in_globals {
            "workbook globals have no EOF".into()
        } else {
            "no workbook globals BOF found".into()
        }))
    }

    /// BOUNDSHEET: offset(4) + visibility(1) + type(1) + short string
    fn parse_boundsheet(data: &[u8]) -> XlsResult<SheetInfo> {
        let mut cur = RecordCursor::new(data);
        let offset = cur.u32()?;
        let _visibility = cur.u8()?;
        let sheet_type = cur.u8()?;
        let name = read_short_string(&mut cur)?;

        Ok(SheetInfo {
            offset,
            sheet_type,
            name,
        })
    }

    /// Locate the sheet's BOF record: by the BOUNDSHEET stream offset, or by
    /// position among the substreams after the globals when the offset is
    /// stale.
    fn find_substream(
        all_records: &[BiffRecord],
        globals: &Globals,
        biff_idx: usize,
        info: &SheetInfo,
    ) -> XlsResult<usize> {
        if let Some(idx) = all_records.iter().position(|r| {
            r.record_type == records::BOF && r.stream_offset == info.offset as usize
        }) {
            return Ok(idx);
        }

        log::warn!(
            "No BOF at offset {} for sheet '{}', matching substreams by position",
            info.offset,
            info.name
        );

        let mut depth = 0usize;
        let mut ordinal = 0usize;
        for (idx, rec) in all_records.iter().enumerate().skip(globals.end + 1) {
            match rec.record_type {
                records::BOF => {
                    if depth == 0 {
                        if ordinal == biff_idx {
                            return Ok(idx);
                        }
                        ordinal += 1;
                    }
                    depth += 1;
                }
                records::EOF => depth = depth.saturating_sub(1),
                _ => {}
            }
        }

        Err(XlsError::InvalidFormat(format!(
            "substream for sheet '{}' not found",
            info.name
        )))
    }

    /// Records of one substream, stopping at its EOF and leaving out nested
    /// (embedded chart) substreams.
    fn substream_records(records: &[BiffRecord]) -> Vec<&BiffRecord> {
        let mut depth = 1usize;
        let mut out = Vec::new();

        for rec in records {
            match rec.record_type {
                records::BOF => depth += 1,
                records::EOF => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ if depth == 1 => out.push(rec),
                _ => {}
            }
        }

        out
    }

    /// Parse cell records from a sheet's record group.
    fn parse_sheet_records(
        records: &[&BiffRecord],
        sheet: &mut Sheet,
        globals: &Globals,
    ) -> XlsResult<()> {
        // A STRING record carries the cached text of the FORMULA before it
        let mut pending_formula_cell: Option<(usize, usize)> = None;

        for rec in records {
            let mut cur = RecordCursor::new(&rec.data);
            match rec.record_type {
                records::LABELSST => {
                    let (row, col, _xf) = Self::cell_header(&mut cur)?;
                    let sst_idx = cur.u32()? as usize;
                    match globals.sst.get(sst_idx) {
                        Some(s) => sheet.set(row, col, CellValue::text(s)),
                        None => log::warn!("SST index {} out of bounds", sst_idx),
                    }
                    pending_formula_cell = None;
                }
                records::LABEL => {
                    let (row, col, _xf) = Self::cell_header(&mut cur)?;
                    sheet.set(row, col, CellValue::text(read_unicode_string(&mut cur)?));
                    pending_formula_cell = None;
                }
                records::NUMBER => {
                    let (row, col, xf) = Self::cell_header(&mut cur)?;
                    let value = cur.f64()?;
                    sheet.set(row, col, Self::number_value(value, xf, globals));
                    pending_formula_cell = None;
                }
                records::RK => {
                    let (row, col, xf) = Self::cell_header(&mut cur)?;
                    let value = cur.rk()?;
                    sheet.set(row, col, Self::number_value(value, xf, globals));
                    pending_formula_cell = None;
                }
                records::MULRK => {
                    Self::parse_mulrk(&mut cur, sheet, globals)?;
                    pending_formula_cell = None;
                }
                records::BOOLERR => {
                    let (row, col, _xf) = Self::cell_header(&mut cur)?;
                    let value = cur.u8()?;
                    let is_error = cur.u8()? != 0;
                    let cell = if is_error {
                        CellValue::string(error_text(value))
                    } else {
                        CellValue::Boolean(value != 0)
                    };
                    sheet.set(row, col, cell);
                    pending_formula_cell = None;
                }
                records::FORMULA => {
                    pending_formula_cell = Self::parse_formula(&mut cur, sheet, globals)?;
                }
                records::STRING => {
                    if let Some((row, col)) = pending_formula_cell.take() {
                        sheet.set(row, col, CellValue::text(read_unicode_string(&mut cur)?));
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// row(2) + col(2) + xf(2), common to every cell record
    fn cell_header(cur: &mut RecordCursor<'_>) -> XlsResult<(usize, usize, u16)> {
        let row = cur.u16()? as usize;
        let col = cur.u16()? as usize;
        let xf = cur.u16()?;
        Ok((row, col, xf))
    }

    fn number_value(value: f64, xf: u16, globals: &Globals) -> CellValue {
        if globals.formats.is_date(xf) {
            if let Some(text) = serial_to_text(value, globals.date_1904) {
                return CellValue::string(text);
            }
        }
        CellValue::Number(value)
    }

    /// MULRK: row(2) + first_col(2) + [xf(2) + rk(4)]* + last_col(2)
    fn parse_mulrk(cur: &mut RecordCursor<'_>, sheet: &mut Sheet, globals: &Globals) -> XlsResult<()> {
        let row = cur.u16()? as usize;
        let first_col = cur.u16()? as usize;
        if cur.remaining() < 2 {
            return Err(XlsError::Parse("MULRK record too short".into()));
        }

        let count = (cur.remaining() - 2) / 6;
        for i in 0..count {
            let xf = cur.u16()?;
            let value = cur.rk()?;
            sheet.set(row, first_col + i, Self::number_value(value, xf, globals));
        }
        Ok(())
    }

    /// FORMULA: row(2) + col(2) + xf(2) + result(8) + options(2) + reserved(4) + parsed formula
    ///
    /// Only the cached result is kept. Returns the cell position when the
    /// result is a string, which arrives in the following STRING record.
    fn parse_formula(
        cur: &mut RecordCursor<'_>,
        sheet: &mut Sheet,
        globals: &Globals,
    ) -> XlsResult<Option<(usize, usize)>> {
        let (row, col, xf) = Self::cell_header(cur)?;
        let result = cur.bytes(8)?;

        // Non-numeric results are flagged by 0xFFFF in the top two bytes
        if result[6] != 0xFF || result[7] != 0xFF {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(result);
            sheet.set(row, col, Self::number_value(f64::from_le_bytes(raw), xf, globals));
            return Ok(None);
        }

        match result[0] {
            0x00 => return Ok(Some((row, col))),
            0x01 => sheet.set(row, col, CellValue::Boolean(result[2] != 0)),
            0x02 => sheet.set(row, col, CellValue::string(error_text(result[2]))),
            // 0x03 is an empty string result
            _ => {}
        }
        Ok(None)
    }
}

/// Display text for a BIFF error code
fn error_text(code: u8) -> &'static str {
    match code {
        0x00 => "#NULL!",
        0x07 => "#DIV/0!",
        0x0F => "#VALUE!",
        0x17 => "#REF!",
        0x1D => "#NAME?",
        0x24 => "#NUM!",
        0x2A => "#N/A",
        0x2B => "#GETTING_DATA",
        _ => "#VALUE!",
    }
}

//! BIFF8 Unicode strings.
//!
//! Header: character count (1 or 2 bytes) and a flags byte:
//! - bit 0 (`fHighByte`): 0 = compressed Latin-1, 1 = UTF-16LE
//! - bit 2 (`fExtSt`): a 4-byte size of trailing phonetic data follows
//! - bit 3 (`fRichSt`): a 2-byte rich text run count follows
//!
//! Character data comes next, then the runs (4 bytes each) and the phonetic
//! block. Inside the SST, character data may be split by a CONTINUE record;
//! the continuation then starts with a fresh flags byte that can switch
//! between compressed and UTF-16.

use super::parser::RecordCursor;
use crate::error::{XlsError, XlsResult};

/// Read a string with a 1-byte length prefix (BOUNDSHEET names).
pub fn read_short_string(cur: &mut RecordCursor<'_>) -> XlsResult<String> {
    let char_count = cur.u8()? as usize;
    let flags = cur.u8()?;
    let mut units = Vec::with_capacity(char_count);
    push_units(cur.bytes(char_count * width(flags))?, flags, &mut units);
    decode_utf16(&units)
}

/// Read a string with a 2-byte length prefix (LABEL, STRING, FORMAT).
pub fn read_unicode_string(cur: &mut RecordCursor<'_>) -> XlsResult<String> {
    read_string_across(cur, &[])
}

/// Read a 2-byte-prefixed string whose character data may be split at the
/// given continuation offsets.
fn read_string_across(cur: &mut RecordCursor<'_>, boundaries: &[usize]) -> XlsResult<String> {
    let header_start = cur.position();
    let char_count = cur.u16()? as usize;
    let mut flags = cur.u8()?;

    let run_count = if flags & 0x08 != 0 { cur.u16()? as usize } else { 0 };
    let ext_size = if flags & 0x04 != 0 { cur.u32()? as usize } else { 0 };

    let mut units = Vec::with_capacity(char_count);
    let mut remaining = char_count;

    while remaining > 0 {
        let pos = cur.position();
        if pos > header_start && boundaries.contains(&pos) {
            flags = cur.u8()?;
        }

        let pos = cur.position();
        let available = boundaries
            .iter()
            .find(|&&b| b > pos)
            .map(|b| b - pos)
            .unwrap_or_else(|| cur.remaining());
        let n = remaining.min(available / width(flags));
        if n == 0 {
            return Err(XlsError::Parse(format!(
                "string data too short: {} characters missing at offset {}",
                remaining, pos
            )));
        }

        push_units(cur.bytes(n * width(flags))?, flags, &mut units);
        remaining -= n;
    }

    cur.skip(run_count * 4 + ext_size);
    decode_utf16(&units)
}

fn width(flags: u8) -> usize {
    if flags & 0x01 != 0 {
        2
    } else {
        1
    }
}

fn push_units(bytes: &[u8], flags: u8, units: &mut Vec<u16>) {
    if flags & 0x01 != 0 {
        units.extend(bytes.chunks_exact(2).map(|b| u16::from_le_bytes([b[0], b[1]])));
    } else {
        units.extend(bytes.iter().map(|&b| b as u16));
    }
}

fn decode_utf16(units: &[u16]) -> XlsResult<String> {
    String::from_utf16(units).map_err(|e| XlsError::Parse(format!("invalid UTF-16 string: {e}")))
}

/// Parse the Shared String Table from an SST record with its CONTINUE
/// bodies merged.
///
/// Body: total reference count (u32), unique count (u32), then the unique
/// strings. A damaged tail is logged and the strings read so far are kept.
pub fn parse_sst(data: &[u8], continuations: &[usize]) -> XlsResult<Vec<String>> {
    let mut cur = RecordCursor::new(data);
    let _total = cur.u32()?;
    let unique_count = cur.u32()? as usize;

    let mut strings = Vec::with_capacity(unique_count.min(data.len()));
    for i in 0..unique_count {
        match read_string_across(&mut cur, continuations) {
            Ok(s) => strings.push(s),
            Err(e) => {
                log::warn!("SST parse error at string {i}/{unique_count}: {e}");
                break;
            }
        }
    }

    Ok(strings)
}

//! BIFF8 (Binary Interchange File Format) records.
//!
//! A BIFF8 stream is a sequence of records, each with a 4-byte header
//! (2 bytes record type + 2 bytes body length) followed by the body.
//! CONTINUE records (type 0x003C) extend the body of the preceding record
//! beyond the 8224-byte per-record limit; they are merged into their parent
//! here, remembering where each continuation began because SST strings
//! restart their encoding flags at those boundaries.

pub mod parser;
pub mod records;
pub mod strings;

use crate::error::{XlsError, XlsResult};
use parser::RecordCursor;

/// A single BIFF8 record with CONTINUE bodies merged.
#[derive(Debug, Clone, PartialEq)]
pub struct BiffRecord {
    /// Record type ID (e.g. `records::SST`, `records::NUMBER`).
    pub record_type: u16,
    /// Record body bytes, CONTINUE bodies appended.
    pub data: Vec<u8>,
    /// Offsets into `data` where each CONTINUE body starts.
    pub continuations: Vec<usize>,
    /// Byte offset of this record's header in the stream.
    pub stream_offset: usize,
}

/// Split a workbook stream into records.
///
/// A truncated trailing record is dropped with a warning; files written by
/// some exporters pad the stream with garbage after the final EOF.
pub fn read_all_records(stream: &[u8]) -> Vec<BiffRecord> {
    let mut records: Vec<BiffRecord> = Vec::new();
    let mut pos = 0usize;

    while pos + 4 <= stream.len() {
        let record_type = u16::from_le_bytes([stream[pos], stream[pos + 1]]);
        let body_len = u16::from_le_bytes([stream[pos + 2], stream[pos + 3]]) as usize;
        let body_start = pos + 4;

        let Some(body) = stream.get(body_start..body_start + body_len) else {
            log::warn!(
                "Truncated BIFF record 0x{:04X} at offset {}",
                record_type,
                pos
            );
            break;
        };

        if record_type == records::CONTINUE {
            match records.last_mut() {
                Some(prev) => {
                    prev.continuations.push(prev.data.len());
                    prev.data.extend_from_slice(body);
                }
                None => log::warn!("Orphaned CONTINUE record at offset {}", pos),
            }
        } else {
            records.push(BiffRecord {
                record_type,
                data: body.to_vec(),
                continuations: Vec::new(),
                stream_offset: pos,
            });
        }

        pos = body_start + body_len;
    }

    records
}

/// Extract `(version, substream_type)` from a BOF record body.
pub fn parse_bof(data: &[u8]) -> XlsResult<(u16, u16)> {
    if data.len() < 4 {
        return Err(XlsError::InvalidFormat("BOF record too short".into()));
    }
    let mut cur = RecordCursor::new(data);
    Ok((cur.u16()?, cur.u16()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(record_type: u16, body: &[u8]) -> Vec<u8> {
        let mut out = record_type.to_le_bytes().to_vec();
        out.extend_from_slice(&(body.len() as u16).to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn test_continue_records_are_merged() {
        let mut stream = raw(records::SST, &[1, 2, 3]);
        stream.extend(raw(records::CONTINUE, &[4, 5]));
        stream.extend(raw(records::CONTINUE, &[6]));
        stream.extend(raw(records::EOF, &[]));

        let recs = read_all_records(&stream);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].data, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(recs[0].continuations, vec![3, 5]);
        assert_eq!(recs[1].record_type, records::EOF);
        assert_eq!(recs[1].stream_offset, 4 + 3 + 4 + 2 + 4 + 1);
    }

    #[test]
    fn test_truncated_record_is_dropped() {
        let mut stream = raw(records::BOF, &[0x00, 0x06, 0x10, 0x00]);
        stream.extend_from_slice(&[0x03, 0x02, 0x0E, 0x00, 0x01]);

        let recs = read_all_records(&stream);
        assert_eq!(recs.len(), 1);
        assert_eq!(parse_bof(&recs[0].data).unwrap(), (0x0600, 0x0010));
    }
}

//! Number formats from `xl/styles.xml`
//!
//! Only what date detection needs: custom `numFmt` codes and the
//! `numFmtId` of every `cellXfs` entry.

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tabload_core::date::is_date_format;

use crate::error::{XlsxError, XlsxResult};

/// Per-style flag telling whether a cell style displays a date
#[derive(Debug, Clone, Default)]
pub(crate) struct DateStyles {
    date_xfs: Vec<bool>,
}

impl DateStyles {
    /// Check whether the cell style `s` uses a date/time number format
    pub(crate) fn is_date(&self, style_idx: Option<u32>) -> bool {
        style_idx
            .and_then(|s| self.date_xfs.get(s as usize))
            .copied()
            .unwrap_or(false)
    }
}

pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<DateStyles> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut numfmts: HashMap<u32, String> = HashMap::new();
    let mut xf_numfmt_ids: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => xf_numfmt_ids.push(numfmt_id(&e)),
                b"numFmt" => read_numfmt(&e, &mut numfmts),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"xf" if in_cell_xfs => xf_numfmt_ids.push(numfmt_id(&e)),
                b"numFmt" => read_numfmt(&e, &mut numfmts),
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"cellXfs" {
                    in_cell_xfs = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    let date_xfs = xf_numfmt_ids
        .iter()
        .map(|id| is_date_format(*id, numfmts.get(id).map(String::as_str)))
        .collect();

    Ok(DateStyles { date_xfs })
}

fn numfmt_id(e: &BytesStart) -> u32 {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"numFmtId")
        .and_then(|attr| attr.unescape_value().ok().and_then(|s| s.parse().ok()))
        .unwrap_or(0)
}

fn read_numfmt(e: &BytesStart, numfmts: &mut HashMap<u32, String>) {
    let mut id = None;
    let mut code = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"numFmtId" => id = attr.unescape_value().ok().and_then(|s| s.parse().ok()),
            b"formatCode" => code = attr.unescape_value().ok().map(|s| s.to_string()),
            _ => {}
        }
    }
    if let (Some(id), Some(code)) = (id, code) {
        numfmts.insert(id, code);
    }
}

//! Number formats from the FORMAT and XF records, for date detection.

use std::collections::HashMap;

use tabload_core::date::is_date_format;

use crate::biff::parser::RecordCursor;
use crate::biff::strings::read_unicode_string;
use crate::error::XlsResult;

/// Maps cell XF indexes to "displays a date" flags
#[derive(Debug, Default)]
pub(crate) struct DateFormats {
    formats: HashMap<u16, String>,
    xf_formats: Vec<u16>,
}

impl DateFormats {
    /// FORMAT: ifmt(2) + unicode string
    pub(crate) fn add_format(&mut self, data: &[u8]) -> XlsResult<()> {
        let mut cur = RecordCursor::new(data);
        let id = cur.u16()?;
        let code = read_unicode_string(&mut cur)?;
        self.formats.insert(id, code);
        Ok(())
    }

    /// XF: ifnt(2) + ifmt(2) + ... (20 bytes in BIFF8)
    pub(crate) fn add_xf(&mut self, data: &[u8]) -> XlsResult<()> {
        let mut cur = RecordCursor::new(data);
        let _font = cur.u16()?;
        self.xf_formats.push(cur.u16()?);
        Ok(())
    }

    /// Check whether the cell XF at `xf_idx` uses a date/time format
    pub(crate) fn is_date(&self, xf_idx: u16) -> bool {
        self.xf_formats
            .get(xf_idx as usize)
            .map(|&id| is_date_format(id as u32, self.formats.get(&id).map(String::as_str)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xf(ifmt: u16) -> Vec<u8> {
        let mut data = vec![0u8; 20];
        data[2..4].copy_from_slice(&ifmt.to_le_bytes());
        data
    }

    #[test]
    fn test_builtin_and_custom_date_formats() {
        let mut formats = DateFormats::default();
        let mut custom = 164u16.to_le_bytes().to_vec();
        custom.extend_from_slice(&[0x0A, 0x00, 0x00]);
        custom.extend_from_slice(b"dd/mm/yyyy");
        formats.add_format(&custom).unwrap();

        formats.add_xf(&xf(0)).unwrap();
        formats.add_xf(&xf(14)).unwrap();
        formats.add_xf(&xf(164)).unwrap();
        formats.add_xf(&xf(2)).unwrap();

        assert!(!formats.is_date(0));
        assert!(formats.is_date(1));
        assert!(formats.is_date(2));
        assert!(!formats.is_date(3));
        assert!(!formats.is_date(40));
    }
}

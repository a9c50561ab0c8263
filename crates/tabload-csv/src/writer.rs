//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tabload_core::Table;

use crate::error::CsvResult;
use crate::options::{CsvWriteOptions, LineTerminator};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a table to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        table: &Table,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(table, file, options)
    }

    /// Write a table to an in-memory buffer
    pub fn to_bytes(table: &Table, options: &CsvWriteOptions) -> CsvResult<Vec<u8>> {
        let mut buf = Vec::new();
        Self::write(table, &mut buf, options)?;
        Ok(buf)
    }

    /// Write a table to a writer
    ///
    /// Output is UTF-8; fields are quoted only when they contain the
    /// delimiter, a quote or a line break.
    pub fn write<W: Write>(table: &Table, mut writer: W, options: &CsvWriteOptions) -> CsvResult<()> {
        if options.byte_order_mark {
            writer.write_all(UTF8_BOM)?;
        }

        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter.as_byte())
            .quote(options.quote)
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(terminator)
            .from_writer(writer);

        if options.write_header {
            csv_writer.write_record(table.columns())?;
        }

        for row in table.rows() {
            csv_writer.write_record(row.cells().iter().map(ToString::to_string))?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Delimiter;
    use pretty_assertions::assert_eq;
    use tabload_core::CellValue;

    fn sample() -> Table {
        let mut table = Table::new(["name", "qty", "ok"]).unwrap();
        table
            .push_row(vec!["Smith, J".into(), 3.0.into(), true.into()])
            .unwrap();
        table
            .push_row(vec!["O\"Neil".into(), 2.5.into(), CellValue::Empty])
            .unwrap();
        table
    }

    #[test]
    fn test_write_defaults() {
        let bytes = CsvWriter::to_bytes(&sample(), &CsvWriteOptions::default()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "name,qty,ok\n\"Smith, J\",3,TRUE\n\"O\"\"Neil\",2.5,\n"
        );
    }

    #[test]
    fn test_write_bom_crlf_semicolon() {
        let options = CsvWriteOptions {
            delimiter: Delimiter::Semicolon,
            byte_order_mark: true,
            line_terminator: LineTerminator::CRLF,
            ..Default::default()
        };
        let bytes = CsvWriter::to_bytes(&sample(), &options).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert_eq!(
            text,
            "name;qty;ok\r\nSmith, J;3;TRUE\r\n\"O\"\"Neil\";2.5;\r\n"
        );
    }

    #[test]
    fn test_write_without_header() {
        let options = CsvWriteOptions {
            write_header: false,
            ..Default::default()
        };
        let bytes = CsvWriter::to_bytes(&sample(), &options).unwrap();
        assert!(String::from_utf8(bytes).unwrap().starts_with("\"Smith, J\""));
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        CsvWriter::write_file(&sample(), &path, &CsvWriteOptions::default()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("name,qty,ok\n"));
    }
}

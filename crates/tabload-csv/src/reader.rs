//! CSV reader

use tabload_core::{is_blank_header, normalize_headers, CellValue, Table};

use crate::candidates::Candidate;
use crate::encoding::TextEncoding;
use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;

/// CSV reader
///
/// Reads one candidate at a time; trying candidates in order is up to the
/// caller.
pub struct CsvReader;

impl CsvReader {
    /// Decode bytes with `encoding` and parse them into a table
    pub fn read_bytes(
        bytes: &[u8],
        encoding: TextEncoding,
        options: &CsvReadOptions,
    ) -> CsvResult<Table> {
        let text = encoding.decode(bytes)?;
        Self::read_str(&text, options)
    }

    /// Decode and parse bytes using a planned candidate
    pub fn read_candidate(
        bytes: &[u8],
        candidate: Candidate,
        options: &CsvReadOptions,
    ) -> CsvResult<Table> {
        let options = CsvReadOptions {
            delimiter: candidate.delimiter,
            ..options.clone()
        };
        Self::read_bytes(bytes, candidate.encoding, &options)
    }

    /// Parse decoded text into a table
    ///
    /// After `skip_rows` records the next record is the header; every later
    /// record must have exactly as many fields as the header.
    pub fn read_str(text: &str, options: &CsvReadOptions) -> CsvResult<Table> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter.as_byte())
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut records = csv_reader.records();

        for _ in 0..options.skip_rows {
            match records.next() {
                Some(record) => {
                    record?;
                }
                None => return Err(CsvError::MissingHeader),
            }
        }

        let header = match records.next() {
            Some(record) => record?,
            None => return Err(CsvError::MissingHeader),
        };
        let raw: Vec<&str> = header.iter().collect();
        if is_blank_header(&raw) {
            return Err(CsvError::MissingHeader);
        }

        let mut table = Table::new(normalize_headers(&raw))?;
        let width = table.column_count();

        for result in records {
            let record = result?;
            if record.len() != width {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                log::debug!(
                    "line {} has {} fields, header has {}",
                    line,
                    record.len(),
                    width
                );
                return Err(CsvError::Shape {
                    line,
                    expected: width,
                    found: record.len(),
                });
            }

            let cells = record
                .iter()
                .map(|field| {
                    if options.infer_types {
                        Self::detect_type(field)
                    } else {
                        CellValue::text(field)
                    }
                })
                .collect();
            table.push_row(cells)?;
        }

        Ok(table)
    }

    /// Type a field: empty, boolean, number or text
    ///
    /// Only `true`/`false` (any case) become booleans and only finite
    /// decimal numbers become numbers; everything else stays text verbatim.
    pub fn detect_type(field: &str) -> CellValue {
        if field.is_empty() {
            return CellValue::Empty;
        }

        if field.eq_ignore_ascii_case("true") {
            return CellValue::Boolean(true);
        }
        if field.eq_ignore_ascii_case("false") {
            return CellValue::Boolean(false);
        }

        if looks_numeric(field) {
            if let Ok(n) = field.parse::<f64>() {
                if n.is_finite() {
                    return CellValue::Number(n);
                }
            }
        }

        CellValue::string(field)
    }
}

// Rules out "inf", "NaN" and friends, which f64::from_str accepts
fn looks_numeric(field: &str) -> bool {
    let body = field.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(field);
    body.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}

//! # tabload-csv
//!
//! CSV support for tabload: text encodings, the ordered list of
//! (delimiter, encoding) candidates tried on uploads of unknown shape,
//! single-candidate decoding and parsing, and writing tables back out.

mod candidates;
mod encoding;
mod error;
mod options;
mod reader;
mod writer;

pub use candidates::{candidate_plan, Candidate, FALLBACK_DELIMITERS, FALLBACK_ENCODINGS};
pub use encoding::{DecodeError, TextEncoding};
pub use error::{CsvError, CsvResult};
pub use options::{CsvReadOptions, CsvWriteOptions, Delimiter, LineTerminator};
pub use reader::CsvReader;
pub use writer::CsvWriter;

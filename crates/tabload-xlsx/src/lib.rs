//! # tabload-xlsx
//!
//! XLSX (Office Open XML) reader for tabload.
//!
//! Only cell values are read: shared and inline strings, numbers, booleans,
//! error codes and cached formula results. Styles are consulted just far
//! enough to recognise date-formatted numbers.

pub mod error;
pub mod reader;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;

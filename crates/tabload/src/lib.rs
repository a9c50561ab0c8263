//! # tabload
//!
//! Load uploaded tabular files of uncertain format into a [`Table`].
//!
//! Uploads arrive as raw bytes with a declared kind and, optionally, the
//! uploader's guess at the delimiter and encoding. [`TabularLoader`] turns
//! them into a rectangular table or a descriptive error:
//!
//! - CSV is tried against an ordered list of (delimiter, encoding)
//!   candidates, hints first, then comma/semicolon/tab crossed with
//!   utf-8/utf-8-sig/latin-1. When every candidate fails, the error lists
//!   each attempt and why it was rejected.
//! - XLSX and XLS workbooks are read once through a [`WorkbookBackend`];
//!   the first worksheet (or a selected one) becomes the table.
//!
//! Tables are written back out with [`CsvWriter`]. The [`schedule`] module
//! expands exported class schedules into calendar dates.
//!
//! ## Example
//!
//! ```rust
//! use tabload::prelude::*;
//!
//! let loader = TabularLoader::new();
//! let request = LoadRequest::new(b"a;b\r\n1;2", FileKind::Csv)
//!     .delimiter(Delimiter::Semicolon)
//!     .encoding("latin-1");
//!
//! let table = loader.load(&request).unwrap();
//! assert_eq!(table.columns(), &["a", "b"]);
//! assert_eq!(table.get(0, "b"), Some(&CellValue::string("2")));
//!
//! let csv = CsvWriter::to_bytes(&table, &CsvWriteOptions::default()).unwrap();
//! assert_eq!(csv, b"a,b\n1,2\n");
//! ```

pub mod error;
pub mod loader;
pub mod prelude;
pub mod request;
pub mod schedule;
pub mod workbook;

pub use error::{Attempt, LoadError, LoadFailure, LoadResult};
pub use loader::{Loaded, TabularLoader};
pub use request::{FileKind, LoadOptions, LoadRequest};
pub use schedule::{
    dates_for_pattern, expand_schedule, parse_start_date, parse_week_pattern, ScheduleColumns,
    ScheduleError,
};
pub use workbook::{WorkbookBackend, WorkbookError};

#[cfg(feature = "xls")]
pub use workbook::XlsBackend;
#[cfg(feature = "xlsx")]
pub use workbook::XlsxBackend;

// Re-export core types
pub use tabload_core::{CellValue, Row, Sheet, SheetSelector, Table};

// Re-export CSV types
pub use tabload_csv::{
    Candidate, CsvError, CsvWriteOptions, CsvWriter, DecodeError, Delimiter, LineTerminator,
    TextEncoding,
};

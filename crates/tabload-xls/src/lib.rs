//! # tabload-xls
//!
//! XLS (BIFF8) reader for tabload.
//!
//! This crate handles the legacy Excel binary format (.xls): a Compound File
//! Binary container holding a `Workbook` stream of BIFF8 records. Only cell
//! values are read.

pub mod biff;
pub mod error;
pub mod reader;

mod formats;

pub use error::{XlsError, XlsResult};
pub use reader::XlsReader;

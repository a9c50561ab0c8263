//! # tabload-core
//!
//! Core data structures for the tabload loader.
//!
//! This crate provides the fundamental types used throughout tabload:
//! - [`CellValue`] - A single cell (empty, boolean, number or text)
//! - [`Table`] - Ordered rows of uniformly named columns
//! - [`Sheet`] - A raw, possibly ragged worksheet grid as read from a workbook
//! - [`SheetSelector`] - Which worksheet of a workbook to read
//! - [`date`] - Excel serial date conversion and date number-format detection
//!
//! ## Example
//!
//! ```rust
//! use tabload_core::{CellValue, Table};
//!
//! let mut table = Table::new(["name", "qty"]).unwrap();
//! table.push_row(vec!["apples".into(), 3.0.into()]).unwrap();
//!
//! let row = table.row(0).unwrap();
//! assert_eq!(row.get("qty"), Some(&CellValue::Number(3.0)));
//! ```

pub mod cell;
pub mod date;
pub mod error;
pub mod header;
pub mod selector;
pub mod sheet;
pub mod table;

// Re-exports for convenience
pub use cell::{CellValue, SharedString};
pub use error::{Error, Result};
pub use header::{is_blank_header, normalize_headers};
pub use selector::SheetSelector;
pub use sheet::Sheet;
pub use table::{Row, Table};

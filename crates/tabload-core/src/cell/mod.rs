//! Cell-related types
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a table cell
//! - [`SharedString`] - Reference-counted cell text

mod value;

pub use value::{CellValue, SharedString};

//! Prelude module - common imports for tabload users
//!
//! ```rust
//! use tabload::prelude::*;
//! ```

pub use crate::{
    // Cell and table types
    CellValue,
    // CSV output
    CsvWriteOptions,
    CsvWriter,
    Delimiter,

    // Requests
    FileKind,
    LoadError,
    LoadOptions,
    LoadRequest,
    LoadResult,
    Row,
    SheetSelector,
    Table,

    // Loader
    TabularLoader,
    TextEncoding,
};

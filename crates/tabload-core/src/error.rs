//! Error types for tabload-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or editing a [`crate::Table`]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A table needs at least one column
    #[error("Table has no columns")]
    NoColumns,

    /// No header row to take column names from
    #[error("Missing header row")]
    MissingHeader,

    /// Column names must be unique within a table
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    /// Column not present in the table
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Row length does not match the header
    #[error("Row has {found} cells but the table has {expected} columns")]
    RowLength { expected: usize, found: usize },

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (rows: {1})")]
    RowOutOfBounds(usize, usize),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}

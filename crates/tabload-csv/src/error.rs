//! CSV error types

use thiserror::Error;

use crate::encoding::DecodeError;

/// Result type for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors that can occur during CSV operations
#[derive(Debug, Error)]
pub enum CsvError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Bytes could not be decoded as text
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A data row does not have as many fields as the header
    #[error("Inconsistent row length on line {line}: expected {expected} fields, found {found}")]
    Shape {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// No header row, or a header row with no names in it
    #[error("Missing header row")]
    MissingHeader,

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] tabload_core::Error),
}

impl CsvError {
    /// Check whether this is a decode failure
    pub fn is_decode(&self) -> bool {
        matches!(self, CsvError::Decode(_))
    }

    /// Check whether this is an inconsistent-row-length failure
    pub fn is_shape(&self) -> bool {
        matches!(self, CsvError::Shape { .. })
    }
}

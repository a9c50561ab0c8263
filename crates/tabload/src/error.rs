//! Load error types

use std::fmt;

use tabload_csv::{Candidate, CsvError};
use thiserror::Error;

use crate::request::FileKind;

/// Result type for load operations
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Errors that can occur while loading an upload
#[derive(Debug, Error)]
pub enum LoadError {
    /// Zero-length upload; nothing was attempted
    #[error("Empty input: the upload contains no bytes")]
    EmptyInput,

    /// Every CSV candidate failed
    #[error("{0}")]
    Exhausted(LoadFailure),

    /// No header row, or a header row without any names
    #[error("Missing header row")]
    MissingHeader,

    /// The workbook could not be opened or read
    #[error("Failed to open {kind} workbook: {message}")]
    WorkbookOpen { kind: FileKind, message: String },

    /// The workbook lists no worksheets
    #[error("Workbook contains no worksheets")]
    NoWorksheets,

    /// The selected worksheet does not exist
    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),

    /// The path does not name a supported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Table invariant violation
    #[error("Table error: {0}")]
    Table(#[from] tabload_core::Error),
}

impl LoadError {
    /// The CSV attempts, if every candidate failed
    pub fn failure(&self) -> Option<&LoadFailure> {
        match self {
            LoadError::Exhausted(failure) => Some(failure),
            _ => None,
        }
    }
}

/// One failed CSV candidate
#[derive(Debug)]
pub struct Attempt {
    pub candidate: Candidate,
    pub error: CsvError,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.candidate, self.error)
    }
}

/// Every attempted (delimiter, encoding) pair and why it failed, in the
/// order they were tried
#[derive(Debug, Default)]
pub struct LoadFailure {
    pub attempts: Vec<Attempt>,
}

impl LoadFailure {
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attempt> {
        self.attempts.iter()
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not read CSV with any delimiter/encoding ({} attempts)",
            self.attempts.len()
        )?;
        for attempt in &self.attempts {
            write!(f, "\n  {}", attempt)?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadFailure {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabload_csv::{Delimiter, TextEncoding};

    #[test]
    fn test_failure_lists_attempts_verbatim() {
        let failure = LoadFailure {
            attempts: vec![
                Attempt {
                    candidate: Candidate::new(Delimiter::Comma, TextEncoding::Utf8),
                    error: CsvError::Shape {
                        line: 3,
                        expected: 2,
                        found: 1,
                    },
                },
                Attempt {
                    candidate: Candidate::new(Delimiter::Tab, TextEncoding::Latin1),
                    error: CsvError::MissingHeader,
                },
            ],
        };

        assert_eq!(
            LoadError::Exhausted(failure).to_string(),
            "Could not read CSV with any delimiter/encoding (2 attempts)\n  \
             comma / utf-8: Inconsistent row length on line 3: expected 2 fields, found 1\n  \
             tab / latin-1: Missing header row"
        );
    }

    #[test]
    fn test_workbook_open_message() {
        let err = LoadError::WorkbookOpen {
            kind: FileKind::Xlsx,
            message: "ZIP error: invalid Zip archive".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to open xlsx workbook: ZIP error: invalid Zip archive"
        );
        assert!(err.failure().is_none());
    }
}

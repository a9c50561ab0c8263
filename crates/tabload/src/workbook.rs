//! Workbook reading behind a narrow interface
//!
//! The loader only needs two things from a workbook format: the worksheet
//! names, and one worksheet as a grid of cell values. [`WorkbookBackend`]
//! is that seam; the XLSX and XLS readers plug into it, and tests or
//! embedders can substitute their own.

use std::fmt;
#[cfg(any(feature = "xlsx", feature = "xls"))]
use std::io::Cursor;

use tabload_core::{Sheet, SheetSelector};
use thiserror::Error;

/// Failure reported by a workbook backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkbookError {
    /// The bytes are not a readable workbook; the message is shown verbatim
    #[error("{0}")]
    Open(String),

    #[error("Workbook contains no worksheets")]
    NoWorksheets,

    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),
}

/// Reads worksheets out of workbook bytes
pub trait WorkbookBackend: Send + Sync {
    /// Worksheet names in workbook order
    fn sheet_names(&self, bytes: &[u8]) -> Result<Vec<String>, WorkbookError>;

    /// Read the selected worksheet as a raw grid
    fn read_sheet(&self, bytes: &[u8], selector: &SheetSelector) -> Result<Sheet, WorkbookError>;
}

impl fmt::Debug for dyn WorkbookBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn WorkbookBackend")
    }
}

/// XLSX backend over [`tabload_xlsx::XlsxReader`]
#[cfg(feature = "xlsx")]
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxBackend;

#[cfg(feature = "xlsx")]
impl From<tabload_xlsx::XlsxError> for WorkbookError {
    fn from(err: tabload_xlsx::XlsxError) -> Self {
        use tabload_xlsx::XlsxError;
        match err {
            XlsxError::NoWorksheets => WorkbookError::NoWorksheets,
            XlsxError::SheetNotFound(sheet) => WorkbookError::SheetNotFound(sheet),
            other => WorkbookError::Open(other.to_string()),
        }
    }
}

#[cfg(feature = "xlsx")]
impl WorkbookBackend for XlsxBackend {
    fn sheet_names(&self, bytes: &[u8]) -> Result<Vec<String>, WorkbookError> {
        Ok(tabload_xlsx::XlsxReader::sheet_names(Cursor::new(bytes))?)
    }

    fn read_sheet(&self, bytes: &[u8], selector: &SheetSelector) -> Result<Sheet, WorkbookError> {
        Ok(tabload_xlsx::XlsxReader::read_sheet(
            Cursor::new(bytes),
            selector,
        )?)
    }
}

/// XLS backend over [`tabload_xls::XlsReader`]
#[cfg(feature = "xls")]
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsBackend;

#[cfg(feature = "xls")]
impl From<tabload_xls::XlsError> for WorkbookError {
    fn from(err: tabload_xls::XlsError) -> Self {
        use tabload_xls::XlsError;
        match err {
            XlsError::NoWorksheets => WorkbookError::NoWorksheets,
            XlsError::SheetNotFound(sheet) => WorkbookError::SheetNotFound(sheet),
            other => WorkbookError::Open(other.to_string()),
        }
    }
}

#[cfg(feature = "xls")]
impl WorkbookBackend for XlsBackend {
    fn sheet_names(&self, bytes: &[u8]) -> Result<Vec<String>, WorkbookError> {
        Ok(tabload_xls::XlsReader::sheet_names(Cursor::new(bytes))?)
    }

    fn read_sheet(&self, bytes: &[u8], selector: &SheetSelector) -> Result<Sheet, WorkbookError> {
        Ok(tabload_xls::XlsReader::read_sheet(Cursor::new(bytes), selector)?)
    }
}

/// Stand-in for a format compiled out of this build
#[derive(Debug, Clone, Copy)]
#[cfg_attr(all(feature = "xlsx", feature = "xls"), allow(dead_code))]
pub(crate) struct Unavailable(pub(crate) &'static str);

impl WorkbookBackend for Unavailable {
    fn sheet_names(&self, _bytes: &[u8]) -> Result<Vec<String>, WorkbookError> {
        Err(self.error())
    }

    fn read_sheet(&self, _bytes: &[u8], _selector: &SheetSelector) -> Result<Sheet, WorkbookError> {
        Err(self.error())
    }
}

impl Unavailable {
    fn error(&self) -> WorkbookError {
        WorkbookError::Open(format!("{} support is not enabled in this build", self.0))
    }
}

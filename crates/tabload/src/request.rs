//! Load requests: the uploaded bytes, what kind of file they claim to be,
//! and the caller's hints

use std::fmt;
use std::path::Path;

use tabload_core::SheetSelector;
use tabload_csv::Delimiter;

use crate::error::{LoadError, LoadResult};

/// Declared kind of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Delimited text of unknown encoding
    Csv,
    /// Office Open XML workbook
    Xlsx,
    /// Legacy BIFF8 workbook
    Xls,
}

impl FileKind {
    /// Map a file extension (without the dot, any case) to a kind
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(FileKind::Csv),
            "xlsx" | "xlsm" => Some(FileKind::Xlsx),
            "xls" => Some(FileKind::Xls),
            _ => None,
        }
    }

    /// Pick the kind from a path's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let path = path.as_ref();
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| LoadError::UnsupportedFileType(path.display().to_string()))
    }

    /// Whether the kind is read through a workbook backend
    pub fn is_workbook(self) -> bool {
        !matches!(self, FileKind::Csv)
    }

    pub fn name(self) -> &'static str {
        match self {
            FileKind::Csv => "csv",
            FileKind::Xlsx => "xlsx",
            FileKind::Xls => "xls",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options that shape the loaded table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOptions {
    /// Worksheet to read from a workbook (ignored for CSV)
    pub sheet: SheetSelector,
    /// Rows (workbooks) or records (CSV) discarded before the header row
    pub skip_rows: usize,
    /// Type CSV fields as numbers and booleans; workbook cells keep their
    /// stored types either way
    pub infer_types: bool,
}

/// One upload to load
///
/// Hints are advisory: the delimiter and encoding are tried first for CSV
/// but never required to succeed.
///
/// ```rust
/// use tabload::{Delimiter, FileKind, LoadRequest};
///
/// let request = LoadRequest::new(b"a;b\r\n1;2", FileKind::Csv)
///     .delimiter(Delimiter::Semicolon)
///     .encoding("latin-1");
/// assert_eq!(request.encoding_hint(), Some("latin-1"));
/// ```
#[derive(Debug, Clone)]
pub struct LoadRequest<'a> {
    bytes: &'a [u8],
    kind: FileKind,
    delimiter: Option<Delimiter>,
    encoding: Option<String>,
    options: LoadOptions,
}

impl<'a> LoadRequest<'a> {
    pub fn new(bytes: &'a [u8], kind: FileKind) -> Self {
        Self {
            bytes,
            kind,
            delimiter: None,
            encoding: None,
            options: LoadOptions::default(),
        }
    }

    /// Hint the CSV delimiter
    pub fn delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Hint the CSV encoding by label, e.g. `utf-8`, `utf-8-sig`, `latin-1`
    pub fn encoding<S: Into<String>>(mut self, label: S) -> Self {
        self.encoding = Some(label.into());
        self
    }

    /// Replace all load options
    pub fn options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn sheet(mut self, sheet: SheetSelector) -> Self {
        self.options.sheet = sheet;
        self
    }

    pub fn skip_rows(mut self, skip_rows: usize) -> Self {
        self.options.skip_rows = skip_rows;
        self
    }

    pub fn infer_types(mut self, infer_types: bool) -> Self {
        self.options.infer_types = infer_types;
        self
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn delimiter_hint(&self) -> Option<Delimiter> {
        self.delimiter
    }

    pub fn encoding_hint(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    pub fn load_options(&self) -> &LoadOptions {
        &self.options
    }
}

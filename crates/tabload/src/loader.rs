//! The tabular loader

use tabload_core::Table;
use tabload_csv::{candidate_plan, Candidate, CsvError, CsvReadOptions, CsvReader, TextEncoding};

use crate::error::{Attempt, LoadError, LoadFailure, LoadResult};
use crate::request::{FileKind, LoadRequest};
use crate::workbook::{WorkbookBackend, WorkbookError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A loaded table and how it was obtained
#[derive(Debug)]
pub struct Loaded {
    pub table: Table,
    /// The CSV candidate that produced the table (`None` for workbooks)
    pub candidate: Option<Candidate>,
    /// CSV candidates tried and rejected before the winning one
    pub rejected: Vec<Attempt>,
}

/// Turns uploaded bytes into a [`Table`]
///
/// CSV uploads are tried against an ordered list of (delimiter, encoding)
/// candidates, hinted pairs first, and the first candidate that yields a
/// rectangular table wins. Workbooks are handed to a [`WorkbookBackend`]
/// once, with no fallback.
///
/// The loader holds no mutable state; share one instance freely.
///
/// ```rust
/// use tabload::{FileKind, LoadRequest, TabularLoader};
///
/// let loader = TabularLoader::new();
/// let table = loader
///     .load(&LoadRequest::new(b"a,b\n1,2\n3,4", FileKind::Csv))
///     .unwrap();
/// assert_eq!(table.columns(), &["a", "b"]);
/// assert_eq!(table.row_count(), 2);
/// ```
#[derive(Debug)]
pub struct TabularLoader {
    xlsx: Box<dyn WorkbookBackend>,
    xls: Box<dyn WorkbookBackend>,
}

impl Default for TabularLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TabularLoader {
    /// Create a loader with the built-in workbook readers
    pub fn new() -> Self {
        #[cfg(feature = "xlsx")]
        let xlsx: Box<dyn WorkbookBackend> = Box::new(crate::workbook::XlsxBackend);
        #[cfg(not(feature = "xlsx"))]
        let xlsx: Box<dyn WorkbookBackend> = Box::new(crate::workbook::Unavailable("xlsx"));

        #[cfg(feature = "xls")]
        let xls: Box<dyn WorkbookBackend> = Box::new(crate::workbook::XlsBackend);
        #[cfg(not(feature = "xls"))]
        let xls: Box<dyn WorkbookBackend> = Box::new(crate::workbook::Unavailable("xls"));

        Self { xlsx, xls }
    }

    /// Replace the backend used for `.xlsx` uploads
    pub fn with_xlsx_backend<B: WorkbookBackend + 'static>(mut self, backend: B) -> Self {
        self.xlsx = Box::new(backend);
        self
    }

    /// Replace the backend used for `.xls` uploads
    pub fn with_xls_backend<B: WorkbookBackend + 'static>(mut self, backend: B) -> Self {
        self.xls = Box::new(backend);
        self
    }

    /// Load one upload
    pub fn load(&self, request: &LoadRequest<'_>) -> LoadResult<Table> {
        self.load_detailed(request).map(|loaded| loaded.table)
    }

    /// Load one upload, reporting which CSV candidate won
    pub fn load_detailed(&self, request: &LoadRequest<'_>) -> LoadResult<Loaded> {
        if request.bytes().is_empty() {
            return Err(LoadError::EmptyInput);
        }

        match request.kind() {
            FileKind::Csv => self.load_csv(request),
            kind => self.load_workbook(kind, request),
        }
    }

    /// List the worksheet names of a workbook upload
    pub fn sheet_names(&self, bytes: &[u8], kind: FileKind) -> LoadResult<Vec<String>> {
        if bytes.is_empty() {
            return Err(LoadError::EmptyInput);
        }
        let backend = self
            .backend(kind)
            .ok_or_else(|| LoadError::UnsupportedFileType(format!("{kind} files have no worksheets")))?;

        backend
            .sheet_names(bytes)
            .map_err(|err| workbook_error(kind, err))
    }

    fn backend(&self, kind: FileKind) -> Option<&dyn WorkbookBackend> {
        match kind {
            FileKind::Csv => None,
            FileKind::Xlsx => Some(self.xlsx.as_ref()),
            FileKind::Xls => Some(self.xls.as_ref()),
        }
    }

    fn load_csv(&self, request: &LoadRequest<'_>) -> LoadResult<Loaded> {
        let encoding = request.encoding_hint().and_then(|label| {
            let encoding = TextEncoding::from_label(label);
            if encoding.is_none() {
                tracing::warn!("Ignoring unknown encoding hint {label:?}");
            }
            encoding
        });

        let options = CsvReadOptions {
            skip_rows: request.load_options().skip_rows,
            infer_types: request.load_options().infer_types,
            ..Default::default()
        };

        let plan = candidate_plan(request.delimiter_hint(), encoding);
        let mut failure = LoadFailure::default();

        for candidate in plan {
            match CsvReader::read_candidate(request.bytes(), candidate, &options) {
                Ok(table) => {
                    tracing::info!(
                        "Loaded CSV as {candidate}: {} columns, {} rows after {} failed attempts",
                        table.column_count(),
                        table.row_count(),
                        failure.len()
                    );
                    return Ok(Loaded {
                        table,
                        candidate: Some(candidate),
                        rejected: failure.attempts,
                    });
                }
                // Only a byte-order mark before blank lines: later candidates
                // would read the mark itself as a header
                Err(CsvError::MissingHeader)
                    if candidate.encoding == TextEncoding::Utf8Sig
                        && request.bytes().starts_with(UTF8_BOM) =>
                {
                    tracing::debug!("CSV candidate {candidate} found no header after the byte-order mark");
                    return Err(LoadError::MissingHeader);
                }
                Err(error) => {
                    tracing::debug!("CSV candidate {candidate} rejected: {error}");
                    failure.attempts.push(Attempt { candidate, error });
                }
            }
        }

        // Blank input, or skip_rows past the end, under every candidate
        if failure
            .iter()
            .all(|attempt| matches!(attempt.error, CsvError::MissingHeader))
        {
            return Err(LoadError::MissingHeader);
        }

        tracing::warn!("No CSV candidate succeeded after {} attempts", failure.len());
        Err(LoadError::Exhausted(failure))
    }

    fn load_workbook(&self, kind: FileKind, request: &LoadRequest<'_>) -> LoadResult<Loaded> {
        let options = request.load_options();
        let backend = self
            .backend(kind)
            .ok_or_else(|| LoadError::UnsupportedFileType(kind.to_string()))?;

        let sheet = backend
            .read_sheet(request.bytes(), &options.sheet)
            .map_err(|err| workbook_error(kind, err))?;
        tracing::debug!(
            "Read {kind} worksheet '{}' ({} rows)",
            sheet.name(),
            sheet.row_count()
        );

        let table = sheet
            .into_table(options.skip_rows)
            .map_err(|err| match err {
                tabload_core::Error::MissingHeader => LoadError::MissingHeader,
                other => LoadError::Table(other),
            })?;

        tracing::info!(
            "Loaded {kind} worksheet: {} columns, {} rows",
            table.column_count(),
            table.row_count()
        );
        Ok(Loaded {
            table,
            candidate: None,
            rejected: Vec::new(),
        })
    }
}

fn workbook_error(kind: FileKind, err: WorkbookError) -> LoadError {
    match err {
        WorkbookError::Open(message) => LoadError::WorkbookOpen { kind, message },
        WorkbookError::NoWorksheets => LoadError::NoWorksheets,
        WorkbookError::SheetNotFound(sheet) => LoadError::SheetNotFound(sheet),
    }
}

//! Loading workbook uploads through the workbook backends

use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tabload::prelude::*;
use tabload::{Sheet, WorkbookBackend, WorkbookError, XlsxBackend};

/// Wraps a backend and counts calls into it
struct Counting<B> {
    inner: B,
    calls: Arc<AtomicUsize>,
}

impl<B> Counting<B> {
    fn new(inner: B) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl<B: WorkbookBackend> WorkbookBackend for Counting<B> {
    fn sheet_names(&self, bytes: &[u8]) -> Result<Vec<String>, WorkbookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sheet_names(bytes)
    }

    fn read_sheet(&self, bytes: &[u8], selector: &SheetSelector) -> Result<Sheet, WorkbookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.read_sheet(bytes, selector)
    }
}

/// Backend that serves a fixed list of sheets
struct Fixed(Vec<Sheet>);

impl WorkbookBackend for Fixed {
    fn sheet_names(&self, _bytes: &[u8]) -> Result<Vec<String>, WorkbookError> {
        Ok(self.0.iter().map(|s| s.name().to_string()).collect())
    }

    fn read_sheet(&self, _bytes: &[u8], selector: &SheetSelector) -> Result<Sheet, WorkbookError> {
        if self.0.is_empty() {
            return Err(WorkbookError::NoWorksheets);
        }
        let names: Vec<&str> = self.0.iter().map(Sheet::name).collect();
        selector
            .resolve(&names)
            .map(|idx| self.0[idx].clone())
            .ok_or_else(|| WorkbookError::SheetNotFound(selector.to_string()))
    }
}

fn sheet(name: &str, rows: &[&[&str]]) -> Sheet {
    let mut sheet = Sheet::new(name);
    for (r, cells) in rows.iter().enumerate() {
        for (c, text) in cells.iter().enumerate() {
            sheet.set(r, c, CellValue::text(text));
        }
    }
    sheet
}

const SHEET_XML_HEAD: &str = r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#;

fn schedule_xlsx() -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();

        let parts: [(&str, String); 5] = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#.to_string(),
            ),
            (
                "xl/workbook.xml",
                r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Info" sheetId="1" r:id="rId1"/><sheet name="TKB" sheetId="2" r:id="rId2"/></sheets></workbook>"#.to_string(),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/></Relationships>"#.to_string(),
            ),
            (
                "xl/worksheets/sheet1.xml",
                format!(
                    r#"{SHEET_XML_HEAD}<row r="1"><c r="A1" t="inlineStr"><is><t>read me</t></is></c></row></sheetData></worksheet>"#
                ),
            ),
            (
                "xl/worksheets/sheet2.xml",
                format!(
                    r#"{SHEET_XML_HEAD}<row r="1"><c r="A1" t="inlineStr"><is><t>Banner</t></is></c></row><row r="3"><c r="A3" t="inlineStr"><is><t>Week Pattern</t></is></c><c r="B3" t="inlineStr"><is><t>Thứ</t></is></c></row><row r="4"><c r="A4" t="inlineStr"><is><t>12--5</t></is></c><c r="B4"><v>2</v></c></row></sheetData></worksheet>"#
                ),
            ),
        ];

        for (name, body) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

#[test]
fn test_corrupt_xlsx_is_one_failed_attempt() {
    let (backend, calls) = Counting::new(XlsxBackend);
    let loader = TabularLoader::new().with_xlsx_backend(backend);

    let err = loader
        .load(&LoadRequest::new(b"PK\x03\x04 truncated", FileKind::Xlsx))
        .unwrap_err();

    match err {
        LoadError::WorkbookOpen { kind, message } => {
            assert_eq!(kind, FileKind::Xlsx);
            assert!(!message.is_empty());
        }
        other => panic!("expected WorkbookOpen, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_workbook_open_message_is_verbatim() {
    struct Broken;
    impl WorkbookBackend for Broken {
        fn sheet_names(&self, _bytes: &[u8]) -> Result<Vec<String>, WorkbookError> {
            Err(WorkbookError::Open("bad central directory".into()))
        }
        fn read_sheet(&self, _: &[u8], _: &SheetSelector) -> Result<Sheet, WorkbookError> {
            Err(WorkbookError::Open("bad central directory".into()))
        }
    }

    let loader = TabularLoader::new().with_xls_backend(Broken);
    let err = loader
        .load(&LoadRequest::new(b"\xD0\xCF\x11\xE0", FileKind::Xls))
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to open xls workbook: bad central directory");
}

#[test]
fn test_first_sheet_becomes_table() {
    let (backend, calls) = Counting::new(Fixed(vec![
        sheet("Data", &[&["x", "y"], &["1", "2"], &["3"]]),
        sheet("Other", &[&["z"]]),
    ]));
    let loader = TabularLoader::new().with_xlsx_backend(backend);

    let loaded = loader
        .load_detailed(&LoadRequest::new(b"PK", FileKind::Xlsx))
        .unwrap();
    assert_eq!(loaded.candidate, None);
    assert_eq!(loaded.table.columns(), &["x", "y"]);
    assert_eq!(
        loaded.table.records(),
        &[
            vec![CellValue::string("1"), CellValue::string("2")],
            vec![CellValue::string("3"), CellValue::Empty],
        ]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_zero_worksheets() {
    let loader = TabularLoader::new().with_xlsx_backend(Fixed(Vec::new()));
    let err = loader
        .load(&LoadRequest::new(b"PK", FileKind::Xlsx))
        .unwrap_err();
    assert!(matches!(err, LoadError::NoWorksheets));
}

#[test]
fn test_blank_header_row() {
    let loader = TabularLoader::new().with_xlsx_backend(Fixed(vec![sheet(
        "Blank",
        &[&["", " "], &["1", "2"]],
    )]));
    let err = loader
        .load(&LoadRequest::new(b"PK", FileKind::Xlsx))
        .unwrap_err();
    assert!(matches!(err, LoadError::MissingHeader));
}

#[test]
fn test_empty_workbook_bytes() {
    let (backend, calls) = Counting::new(XlsxBackend);
    let loader = TabularLoader::new().with_xlsx_backend(backend);
    let err = loader
        .load(&LoadRequest::new(b"", FileKind::Xlsx))
        .unwrap_err();
    assert!(matches!(err, LoadError::EmptyInput));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_real_xlsx_sheet_selection_and_skip_rows() {
    let bytes = schedule_xlsx();
    let loader = TabularLoader::new();

    assert_eq!(
        loader.sheet_names(&bytes, FileKind::Xlsx).unwrap(),
        vec!["Info", "TKB"]
    );

    let first = loader
        .load(&LoadRequest::new(&bytes, FileKind::Xlsx))
        .unwrap();
    assert_eq!(first.columns(), &["read me"]);

    let table = loader
        .load(
            &LoadRequest::new(&bytes, FileKind::Xlsx)
                .sheet(SheetSelector::Name("TKB".into()))
                .skip_rows(2),
        )
        .unwrap();
    assert_eq!(table.columns(), &["Week Pattern", "Thứ"]);
    assert_eq!(
        table.records(),
        &[vec![CellValue::string("12--5"), CellValue::Number(2.0)]]
    );

    let err = loader
        .load(&LoadRequest::new(&bytes, FileKind::Xlsx).sheet(SheetSelector::Name("Nope".into())))
        .unwrap_err();
    assert!(matches!(err, LoadError::SheetNotFound(_)));
}

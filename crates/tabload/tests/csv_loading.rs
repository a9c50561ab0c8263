//! Loading CSV uploads through the candidate fallback

use pretty_assertions::assert_eq;
use tabload::prelude::*;
use tabload::{Candidate, LoadFailure};

fn csv(bytes: &[u8]) -> LoadRequest<'_> {
    LoadRequest::new(bytes, FileKind::Csv)
}

fn exhausted(err: LoadError) -> LoadFailure {
    match err {
        LoadError::Exhausted(failure) => failure,
        other => panic!("expected exhausted candidates, got {other:?}"),
    }
}

#[test]
fn test_utf8_comma_wins_on_first_candidate() {
    let loader = TabularLoader::new();
    let loaded = loader
        .load_detailed(&csv("name,city\nAn,Hà Nội\nBình,Huế\n".as_bytes()))
        .unwrap();

    assert_eq!(
        loaded.candidate,
        Some(Candidate::new(Delimiter::Comma, TextEncoding::Utf8))
    );
    assert!(loaded.rejected.is_empty());
    assert_eq!(loaded.table.columns(), &["name", "city"]);
    assert_eq!(loaded.table.get(0, "city"), Some(&CellValue::string("Hà Nội")));
}

#[test]
fn test_simple_scenario() {
    let loader = TabularLoader::new();
    let table = loader.load(&csv(b"a,b\n1,2\n3,4")).unwrap();

    assert_eq!(table.columns(), &["a", "b"]);
    let rows: Vec<Vec<(&str, String)>> = table
        .rows()
        .map(|row| row.iter().map(|(k, v)| (k, v.to_string())).collect())
        .collect();
    assert_eq!(
        rows,
        vec![
            vec![("a", "1".to_string()), ("b", "2".to_string())],
            vec![("a", "3".to_string()), ("b", "4".to_string())],
        ]
    );
}

#[test]
fn test_latin1_semicolon_with_hints() {
    let loader = TabularLoader::new();
    let table = loader
        .load(
            &csv(b"a;b\r\n1;2")
                .delimiter(Delimiter::Semicolon)
                .encoding("latin-1"),
        )
        .unwrap();

    assert_eq!(table.columns(), &["a", "b"]);
    assert_eq!(
        table.records(),
        &[vec![CellValue::string("1"), CellValue::string("2")]]
    );
}

#[test]
fn test_latin1_semicolon_reached_with_delimiter_hint_only() {
    // "José;Zürich" in latin-1 is not valid UTF-8
    let bytes = b"name;city\nJos\xE9;Z\xFCrich\n";
    let loader = TabularLoader::new();
    let loaded = loader
        .load_detailed(&csv(bytes).delimiter(Delimiter::Semicolon))
        .unwrap();

    assert_eq!(
        loaded.candidate,
        Some(Candidate::new(Delimiter::Semicolon, TextEncoding::Latin1))
    );
    assert_eq!(loaded.rejected.len(), 2);
    assert!(loaded.rejected.iter().all(|a| a.error.is_decode()));
    assert_eq!(
        loaded.table.records(),
        &[vec![CellValue::string("José"), CellValue::string("Zürich")]]
    );
}

#[test]
fn test_byte_order_mark_goes_to_utf8_sig() {
    let loader = TabularLoader::new();
    let loaded = loader
        .load_detailed(&csv(b"\xEF\xBB\xBFid,label\n1,x\n"))
        .unwrap();

    assert_eq!(
        loaded.candidate,
        Some(Candidate::new(Delimiter::Comma, TextEncoding::Utf8Sig))
    );
    assert_eq!(loaded.table.columns(), &["id", "label"]);
}

#[test]
fn test_inconsistent_rows_exhaust_all_candidates() {
    let bytes = b"a,b,c;d;e\tf\n1,2;3\n";
    let loader = TabularLoader::new();
    let failure = exhausted(loader.load(&csv(bytes)).unwrap_err());

    assert_eq!(failure.len(), 9);
    assert!(failure.iter().all(|attempt| attempt.error.is_shape()));

    let tried: Vec<String> = failure.iter().map(|a| a.candidate.to_string()).collect();
    assert_eq!(
        tried,
        vec![
            "comma / utf-8",
            "comma / utf-8-sig",
            "comma / latin-1",
            "semicolon / utf-8",
            "semicolon / utf-8-sig",
            "semicolon / latin-1",
            "tab / utf-8",
            "tab / utf-8-sig",
            "tab / latin-1",
        ]
    );
}

#[test]
fn test_hinted_pair_is_not_tried_twice() {
    let bytes = b"a,b,c;d;e\tf\n1,2;3\n";
    let loader = TabularLoader::new();
    let err = loader
        .load(&csv(bytes).delimiter(Delimiter::Tab).encoding("utf-8"))
        .unwrap_err();

    let message = err.to_string();
    let failure = exhausted(err);
    assert_eq!(failure.len(), 9);
    assert_eq!(
        failure.attempts[0].candidate,
        Candidate::new(Delimiter::Tab, TextEncoding::Utf8)
    );
    assert_eq!(message.matches("tab / utf-8:").count(), 1);
    assert!(message.starts_with("Could not read CSV with any delimiter/encoding (9 attempts)"));
}

#[test]
fn test_empty_input_attempts_nothing() {
    let loader = TabularLoader::new();
    let err = loader
        .load(&csv(b"").delimiter(Delimiter::Comma).encoding("utf-8"))
        .unwrap_err();
    assert!(matches!(err, LoadError::EmptyInput));
}

#[test]
fn test_skip_rows_before_header() {
    let bytes = b"Exported schedule\nSemester 2;2024\n\nsubject,room\nMath,A1\n";
    let loader = TabularLoader::new();
    let table = loader.load(&csv(bytes).skip_rows(2)).unwrap();

    assert_eq!(table.columns(), &["subject", "room"]);
    assert_eq!(table.row_count(), 1);

    let err = loader.load(&csv(bytes).skip_rows(10)).unwrap_err();
    assert!(matches!(err, LoadError::MissingHeader));
}

#[test]
fn test_infer_types() {
    let bytes = b"qty,flag,note\n1.5,true,\n-2e3,FALSE,x\n";
    let loader = TabularLoader::new();

    let typed = loader.load(&csv(bytes).infer_types(true)).unwrap();
    assert_eq!(
        typed.records(),
        &[
            vec![CellValue::Number(1.5), CellValue::Boolean(true), CellValue::Empty],
            vec![
                CellValue::Number(-2000.0),
                CellValue::Boolean(false),
                CellValue::string("x"),
            ],
        ]
    );

    let text = loader.load(&csv(bytes)).unwrap();
    assert_eq!(text.get(0, "qty"), Some(&CellValue::string("1.5")));
    assert_eq!(text.get(0, "note"), Some(&CellValue::Empty));
}

#[test]
fn test_blank_and_duplicate_headers() {
    let loader = TabularLoader::new();
    let table = loader.load(&csv(b"a,,a\n1,2,3\n")).unwrap();
    assert_eq!(table.columns(), &["a", "Unnamed: 1", "a.1"]);
}

#[test]
fn test_quoted_fields() {
    let bytes = b"name,note\n\"Smith, J\",\"line one\nline two\"\n";
    let loader = TabularLoader::new();
    let table = loader.load(&csv(bytes)).unwrap();

    assert_eq!(table.row_count(), 1);
    assert_eq!(table.get(0, "name"), Some(&CellValue::string("Smith, J")));
    assert_eq!(
        table.get(0, "note"),
        Some(&CellValue::string("line one\nline two"))
    );
}

#[test]
fn test_tab_file_needs_its_hint() {
    let bytes = b"a\tb\n1\t2\n";
    let loader = TabularLoader::new();

    // A single column is still rectangular, so comma wins without a hint
    let guessed = loader.load(&csv(bytes)).unwrap();
    assert_eq!(guessed.columns(), &["a\tb"]);

    let hinted = loader.load(&csv(bytes).delimiter(Delimiter::Tab)).unwrap();
    assert_eq!(hinted.columns(), &["a", "b"]);
}

use super::*;
use crate::types::GridPosition;
use std::path::Path;

fn grid(values: &[&[&str]]) -> Vec<Vec<String>> {
    values
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect()
}

#[test]
fn test_detect_by_extension() {
    assert_eq!(
        DelimiterFormat::from_path(Path::new("data.tsv")),
        DelimiterFormat::Tab
    );
    assert_eq!(
        DelimiterFormat::from_path(Path::new("data.tab")),
        DelimiterFormat::Tab
    );
    assert_eq!(
        DelimiterFormat::from_path(Path::new("notes.txt")),
        DelimiterFormat::Tab
    );
    assert_eq!(
        DelimiterFormat::from_path(Path::new("data.CSV")),
        DelimiterFormat::Comma
    );
    assert_eq!(
        DelimiterFormat::from_path(Path::new("mystery.dat")),
        DelimiterFormat::Tab
    );
}

#[test]
fn test_parse_plain_tsv() {
    let outcome = parse("a\tb\nc\td", DelimiterFormat::Tab);
    assert_eq!(outcome.rows, grid(&[&["a", "b"], &["c", "d"]]));
    assert!(outcome.warning.is_none());
}

#[test]
fn test_parse_line_terminators() {
    for text in ["a\nb", "a\r\nb", "a\rb"] {
        let outcome = parse(text, DelimiterFormat::Tab);
        assert_eq!(outcome.rows, grid(&[&["a"], &["b"]]), "input {text:?}");
    }
}

#[test]
fn test_parse_trailing_newline_emits_no_row() {
    let outcome = parse("a\tb\n", DelimiterFormat::Tab);
    assert_eq!(outcome.rows, grid(&[&["a", "b"]]));

    let outcome = parse("a\tb\r\n", DelimiterFormat::Tab);
    assert_eq!(outcome.rows, grid(&[&["a", "b"]]));
}

#[test]
fn test_parse_blank_line_is_single_empty_field() {
    let outcome = parse("a\n\nb", DelimiterFormat::Tab);
    assert_eq!(outcome.rows, grid(&[&["a"], &[""], &["b"]]));
}

#[test]
fn test_parse_quoted_fields() {
    let outcome = parse("a,\"b,c\",\"d\"\"e\"\n,,\n", DelimiterFormat::Comma);
    assert_eq!(outcome.rows, grid(&[&["a", "b,c", "d\"e"], &["", "", ""]]));
    assert!(outcome.warning.is_none());
}

#[test]
fn test_parse_quoted_newline() {
    let outcome = parse("\"a\nb\",c", DelimiterFormat::Comma);
    assert_eq!(outcome.rows, grid(&[&["a\nb", "c"]]));
}

#[test]
fn test_parse_malformed_quote_is_verbatim_with_warning() {
    let outcome = parse("\"ab\"cd,e", DelimiterFormat::Comma);
    assert_eq!(outcome.rows, grid(&[&["abcd", "e"]]));
    assert!(outcome.warning.is_some());
}

#[test]
fn test_parse_unterminated_quote() {
    let outcome = parse("\"abc", DelimiterFormat::Comma);
    assert_eq!(outcome.rows, grid(&[&["abc"]]));
    assert!(outcome.warning.is_some());
}

#[test]
fn test_serialize_quotes_only_when_needed() {
    let document = Document::from_values(
        grid(&[&["plain", "has,comma", "has\"quote", "has\nnewline"]]),
        DelimiterFormat::Comma,
    );
    assert_eq!(
        serialize(&document),
        "plain,\"has,comma\",\"has\"\"quote\",\"has\nnewline\""
    );
}

#[test]
fn test_serialize_tab_delimiter() {
    let document = Document::from_values(
        grid(&[&["a", "b"], &["c", "d e"]]),
        DelimiterFormat::Tab,
    );
    assert_eq!(serialize(&document), "a\tb\nc\td e");
}

#[test]
fn test_round_trip() {
    let original = grid(&[&["a", "b,c", "d\"e"], &["", "", ""], &["x\ny", "", "z"]]);
    let document = Document::from_values(original.clone(), DelimiterFormat::Comma);
    let text = serialize(&document);
    let outcome = parse(&text, DelimiterFormat::Comma);
    assert_eq!(outcome.rows, original);
    assert!(outcome.warning.is_none());
}

#[test]
fn test_scenario_csv_round_trip() {
    // Parse then re-serialize drops only the trailing newline.
    let input = "a,\"b,c\",\"d\"\"e\"\n,,\n";
    let outcome = parse(input, DelimiterFormat::Comma);
    let document = Document::from_values(outcome.rows, DelimiterFormat::Comma);
    assert_eq!(serialize(&document), "a,\"b,c\",\"d\"\"e\"\n,,");
}

#[test]
fn test_load_and_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.csv");
    std::fs::write(&path, "a,b\nc,d\n").unwrap();

    let mut document = load(&path, None).unwrap();
    assert_eq!(document.delimiter(), DelimiterFormat::Comma);
    assert_eq!(document.values(), grid(&[&["a", "b"], &["c", "d"]]));
    assert!(!document.is_dirty());
    assert_eq!(document.file_path(), Some(path.as_path()));

    document.set_cell(GridPosition::new(0, 0), "edited").unwrap();
    assert!(document.is_dirty());

    save(&mut document, &path).unwrap();
    assert!(!document.is_dirty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "edited,b\nc,d");
}

#[test]
fn test_save_failure_preserves_dirty() {
    let mut document = Document::from_values(grid(&[&["a"]]), DelimiterFormat::Tab);
    document.set_cell(GridPosition::new(0, 0), "x").unwrap();
    let missing = Path::new("/nonexistent-dir-for-sure/out.tsv");
    assert!(save(&mut document, missing).is_err());
    assert!(document.is_dirty());
}

#[test]
fn test_explicit_delimiter_overrides_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.csv");
    std::fs::write(&path, "a\tb").unwrap();

    let document = load(&path, Some(DelimiterFormat::Tab)).unwrap();
    assert_eq!(document.values(), grid(&[&["a", "b"]]));
}

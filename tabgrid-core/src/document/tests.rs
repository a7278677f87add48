use super::*;
use std::cell::RefCell;
use std::rc::Rc;

fn doc(values: &[&[&str]]) -> Document {
    Document::from_values(
        values
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect(),
        DelimiterFormat::Tab,
    )
}

#[test]
fn test_set_cell_marks_dirty_and_emits() {
    let mut document = doc(&[&["a", "b"], &["c", "d"]]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    document.subscribe(Box::new(move |event| sink.borrow_mut().push(event.clone())));

    assert!(!document.is_dirty());
    document.set_cell(GridPosition::new(1, 0), "x").unwrap();
    assert!(document.is_dirty());
    assert_eq!(document.get_cell(GridPosition::new(1, 0)).unwrap(), "x");
    assert_eq!(
        seen.borrow().as_slice(),
        &[DocumentEvent::CellChanged {
            position: GridPosition::new(1, 0)
        }]
    );
}

#[test]
fn test_set_cell_out_of_bounds_leaves_state() {
    let mut document = doc(&[&["a"]]);
    let err = document.set_cell(GridPosition::new(5, 0), "x").unwrap_err();
    assert!(matches!(err, EditorError::OutOfBounds { row: 5, .. }));
    assert!(!document.is_dirty());
}

#[test]
fn test_insert_row_at_end_appends() {
    let mut document = doc(&[&["a", "b"]]);
    document.insert_row(1).unwrap();
    assert_eq!(document.row_count(), 2);
    assert_eq!(document.row_values(1).unwrap(), vec!["", ""]);
    assert!(document.insert_row(5).is_err());
}

#[test]
fn test_delete_only_row_leaves_empty_document() {
    let mut document = doc(&[&["a", "b"]]);
    let removed = document.delete_row(0).unwrap();
    assert_eq!(removed, vec!["a", "b"]);
    assert_eq!(document.row_count(), 0);
    assert!(document.is_empty());
}

#[test]
fn test_insert_delete_column() {
    let mut document = doc(&[&["a", "b"], &["c", "d"]]);
    document
        .insert_column_with(1, vec!["x".into(), "y".into()])
        .unwrap();
    assert_eq!(document.values(), vec![vec!["a", "x", "b"], vec!["c", "y", "d"]]);

    let removed = document.delete_column(1).unwrap();
    assert_eq!(removed, vec!["x", "y"]);
    assert_eq!(document.values(), vec![vec!["a", "b"], vec!["c", "d"]]);
}

#[test]
fn test_sort_is_stable() {
    let mut document = doc(&[&["b", "1"], &["a", "2"], &["b", "3"], &["a", "4"]]);
    document.sort_by_column(0, true).unwrap();
    assert_eq!(
        document.values(),
        vec![vec!["a", "2"], vec!["a", "4"], vec!["b", "1"], vec!["b", "3"]]
    );

    document.sort_by_column(0, false).unwrap();
    assert_eq!(
        document.values(),
        vec![vec!["b", "1"], vec!["b", "3"], vec!["a", "2"], vec!["a", "4"]]
    );
}

#[test]
fn test_sort_empty_cells_first() {
    let mut document = doc(&[&["b"], &[""], &["a"]]);
    document.sort_by_column(0, true).unwrap();
    assert_eq!(document.values(), vec![vec![""], vec!["a"], vec!["b"]]);
}

#[test]
fn test_find_matches_substring_case_insensitive() {
    let document = doc(&[&["Foo", "bar"], &["foobar", "baz"]]);
    let matches = document.find_matches("foo", false, false).unwrap();
    assert_eq!(
        matches,
        vec![GridPosition::new(0, 0), GridPosition::new(1, 0)]
    );

    let matches = document.find_matches("foo", false, true).unwrap();
    assert_eq!(matches, vec![GridPosition::new(1, 0)]);
}

#[test]
fn test_find_matches_regex() {
    let document = doc(&[&["abc", "a1c"], &["xyz", "a9c"]]);
    let matches = document.find_matches(r"a\dc", true, true).unwrap();
    assert_eq!(
        matches,
        vec![GridPosition::new(0, 1), GridPosition::new(1, 1)]
    );

    let err = document.find_matches("(", true, true).unwrap_err();
    assert!(matches!(err, EditorError::BadPattern(_)));
}

#[test]
fn test_ensure_size_grows_never_shrinks() {
    let mut document = doc(&[&["a"]]);
    document.ensure_size(3, 2);
    assert_eq!(document.row_count(), 3);
    assert_eq!(document.column_count(), 2);

    document.ensure_size(1, 1);
    assert_eq!(document.row_count(), 3);
    assert_eq!(document.column_count(), 2);
}

#[test]
fn test_truncate_to_reverses_growth() {
    let mut document = doc(&[&["a", "b"]]);
    document.ensure_size(4, 5);
    document.truncate_to(1, 2);
    assert_eq!(document.values(), vec![vec!["a", "b"]]);
}

#[test]
fn test_ragged_rows_normalized() {
    let document = Document::from_values(
        vec![vec!["a".into()], vec!["b".into(), "c".into(), "d".into()]],
        DelimiterFormat::Comma,
    );
    assert_eq!(document.column_count(), 3);
    assert_eq!(document.row_values(0).unwrap(), vec!["a", "", ""]);
}

#[test]
fn test_create_empty_extents() {
    let document = Document::create_empty();
    assert_eq!(document.row_count(), EMPTY_DOCUMENT_ROWS);
    assert_eq!(document.column_count(), EMPTY_DOCUMENT_COLUMNS);
    assert!(!document.is_dirty());
}

#[test]
fn test_projection_flags_ignore_stale_positions() {
    let mut document = doc(&[&["a"]]);
    document.set_selected(GridPosition::new(9, 9), true);
    document.set_selected(GridPosition::new(0, 0), true);
    assert!(document.cell(GridPosition::new(0, 0)).unwrap().is_selected);
    assert!(!document.is_dirty());
}

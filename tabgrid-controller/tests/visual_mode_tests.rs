//! Visual-mode behavior through the public API.

use std::time::Instant;
use tabgrid_controller::{EditorController, Key, KeyInput, Mode};
use tabgrid_core::{DelimiterFormat, Document, GridPosition, SelectionKind};

fn editor(values: &[&[&str]]) -> EditorController {
    EditorController::new(Document::from_values(
        values
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect(),
        DelimiterFormat::Tab,
    ))
}

fn feed(ctrl: &mut EditorController, keys: &str) {
    let now = Instant::now();
    for c in keys.chars() {
        ctrl.handle_input(KeyInput::char(c), now);
    }
}

#[test]
fn visual_line_spans_all_columns() {
    let mut ctrl = editor(&[&["a", "b", "c"], &["d", "e", "f"]]);
    feed(&mut ctrl, "V");
    assert_eq!(ctrl.mode(), Mode::Visual(SelectionKind::Line));
    for column in 0..3 {
        assert!(
            ctrl.document()
                .cell(GridPosition::new(0, column))
                .unwrap()
                .is_selected,
            "column {column}"
        );
    }
    assert!(!ctrl.document().cell(GridPosition::new(1, 0)).unwrap().is_selected);
}

#[test]
fn switching_kind_retypes_selection() {
    let mut ctrl = editor(&[&["a", "b"], &["c", "d"]]);
    feed(&mut ctrl, "vj");
    assert_eq!(ctrl.mode(), Mode::Visual(SelectionKind::Character));
    feed(&mut ctrl, "V");
    assert_eq!(ctrl.mode(), Mode::Visual(SelectionKind::Line));
    let range = ctrl.state().selection.unwrap();
    assert_eq!(range.kind, SelectionKind::Line);
    assert_eq!(range.start, GridPosition::new(0, 0));
    assert_eq!(range.end, GridPosition::new(1, 0));
}

#[test]
fn same_kind_key_toggles_visual_off() {
    let mut ctrl = editor(&[&["a", "b"], &["c", "d"]]);
    feed(&mut ctrl, "vv");
    assert_eq!(ctrl.mode(), Mode::Normal);
    assert!(ctrl.state().selection.is_none());
}

#[test]
fn visual_yank_sets_register_with_kind() {
    let mut ctrl = editor(&[&["a", "b"], &["c", "d"]]);
    feed(&mut ctrl, "Vy");
    let yank = ctrl.state().last_yank.as_ref().unwrap();
    assert_eq!(yank.source, SelectionKind::Line);
    assert_eq!(yank.cells, vec![vec!["a".to_string(), "b".to_string()]]);
}

#[test]
fn visual_line_paste_inserts_rows() {
    let mut ctrl = editor(&[&["a", "b"], &["c", "d"]]);
    feed(&mut ctrl, "Vyjp");
    assert_eq!(
        ctrl.document().values(),
        vec![vec!["a", "b"], vec!["c", "d"], vec!["a", "b"]]
    );
}

#[test]
fn visual_delete_is_one_undo_step() {
    let mut ctrl = editor(&[&["a", "b", "c"], &["d", "e", "f"]]);
    feed(&mut ctrl, "vlljd");
    assert_eq!(
        ctrl.document().values(),
        vec![vec!["", "", ""], vec!["", "", ""]]
    );
    ctrl.undo();
    assert_eq!(
        ctrl.document().values(),
        vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]
    );
    assert!(!ctrl.can_undo());
}

#[test]
fn escape_then_operators_do_nothing_without_selection() {
    let mut ctrl = editor(&[&["a", "b"], &["c", "d"]]);
    feed(&mut ctrl, "vj");
    ctrl.handle_input(KeyInput::plain(Key::Escape), Instant::now());
    assert_eq!(ctrl.mode(), Mode::Normal);
    // `d` back in Normal mode starts an operator sequence, not a deletion.
    feed(&mut ctrl, "d");
    assert_eq!(ctrl.document().values(), vec![vec!["a", "b"], vec!["c", "d"]]);
}

#[test]
fn anchor_swap_extends_from_other_end() {
    let mut ctrl = editor(&[&["1"], &["2"], &["3"], &["4"]]);
    feed(&mut ctrl, "jvj");
    // Selection rows 1..2, cursor at head (2,0).
    feed(&mut ctrl, "o");
    assert_eq!(ctrl.cursor(), GridPosition::new(1, 0));
    feed(&mut ctrl, "k");
    let range = ctrl.state().selection.unwrap();
    assert_eq!(range.start_row(), 0);
    assert_eq!(range.end_row(), 2);
}

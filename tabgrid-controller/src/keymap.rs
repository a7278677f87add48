//! Logical key model and the config-driven binding table.
//!
//! Keys arriving here are post-IME logical keys; the host adapter translates
//! its native events before calling in. Bindings map `(mode, key+modifiers)`
//! to action names the dispatcher resolves; the table is reloadable at
//! runtime.

use crate::state::Mode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The key the user intended, after IME processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
    };

    pub fn ctrl() -> Modifiers {
        Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        }
    }
}

/// One key event as the dispatcher sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        KeyInput { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        KeyInput::new(key, Modifiers::NONE)
    }

    pub fn char(c: char) -> Self {
        KeyInput::plain(Key::Char(c))
    }

    pub fn ctrl(c: char) -> Self {
        KeyInput::new(Key::Char(c), Modifiers::ctrl())
    }

    /// Printable character this input would type, if any. Control chords
    /// never type.
    pub fn typed_char(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if !self.modifiers.ctrl && !self.modifiers.alt => Some(c),
            _ => None,
        }
    }

    /// Parse the binding-file syntax: `"j"`, `"ctrl+v"`, `"escape"`,
    /// `"ctrl+alt+x"`.
    pub fn parse(spec: &str) -> Option<KeyInput> {
        let mut modifiers = Modifiers::NONE;
        let mut key = None;
        for part in spec.split('+') {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" => modifiers.ctrl = true,
                "alt" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "enter" | "return" => key = Some(Key::Enter),
                "escape" | "esc" => key = Some(Key::Escape),
                "backspace" => key = Some(Key::Backspace),
                "tab" => key = Some(Key::Tab),
                "delete" => key = Some(Key::Delete),
                "up" => key = Some(Key::Up),
                "down" => key = Some(Key::Down),
                "left" => key = Some(Key::Left),
                "right" => key = Some(Key::Right),
                "home" => key = Some(Key::Home),
                "end" => key = Some(Key::End),
                "pageup" => key = Some(Key::PageUp),
                "pagedown" => key = Some(Key::PageDown),
                other => {
                    // Single characters stand for themselves, case-preserving.
                    let mut chars = part.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => key = Some(Key::Char(c)),
                        _ => {
                            log::warn!("unrecognized key spec fragment: {other}");
                            return None;
                        }
                    }
                }
            }
        }
        key.map(|key| KeyInput { key, modifiers })
    }
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            write!(f, "ctrl+")?;
        }
        if self.modifiers.alt {
            write!(f, "alt+")?;
        }
        if self.modifiers.shift {
            write!(f, "shift+")?;
        }
        match self.key {
            Key::Char(c) => write!(f, "{c}"),
            Key::Enter => write!(f, "enter"),
            Key::Escape => write!(f, "escape"),
            Key::Backspace => write!(f, "backspace"),
            Key::Tab => write!(f, "tab"),
            Key::Delete => write!(f, "delete"),
            Key::Up => write!(f, "up"),
            Key::Down => write!(f, "down"),
            Key::Left => write!(f, "left"),
            Key::Right => write!(f, "right"),
            Key::Home => write!(f, "home"),
            Key::End => write!(f, "end"),
            Key::PageUp => write!(f, "pageup"),
            Key::PageDown => write!(f, "pagedown"),
        }
    }
}

/// Binding lookup collapses the visual variants into one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    Normal,
    Insert,
    Visual,
    Command,
}

impl From<Mode> for MapMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Normal => MapMode::Normal,
            Mode::Insert => MapMode::Insert,
            Mode::Visual(_) => MapMode::Visual,
            Mode::Command => MapMode::Command,
        }
    }
}

/// The `(mode, key) -> action name` table. Action names are plain string
/// identifiers (`"motion.down"`, `"operator.delete"`); the dispatcher owns
/// their meaning and ignores names it does not know.
pub struct KeyBindings {
    map: HashMap<(MapMode, KeyInput), String>,
}

impl KeyBindings {
    /// The stock vim-style table.
    pub fn default_bindings() -> Self {
        let mut bindings = KeyBindings {
            map: HashMap::new(),
        };
        bindings.install_defaults();
        bindings
    }

    fn install_defaults(&mut self) {
        use MapMode::{Command, Insert, Normal, Visual};

        // Motions are shared by Normal and Visual.
        for mode in [Normal, Visual] {
            self.bind(mode, KeyInput::char('h'), "motion.left");
            self.bind(mode, KeyInput::char('j'), "motion.down");
            self.bind(mode, KeyInput::char('k'), "motion.up");
            self.bind(mode, KeyInput::char('l'), "motion.right");
            self.bind(mode, KeyInput::plain(Key::Left), "motion.left");
            self.bind(mode, KeyInput::plain(Key::Down), "motion.down");
            self.bind(mode, KeyInput::plain(Key::Up), "motion.up");
            self.bind(mode, KeyInput::plain(Key::Right), "motion.right");
            self.bind(mode, KeyInput::char('w'), "motion.word_forward");
            self.bind(mode, KeyInput::char('b'), "motion.word_backward");
            self.bind(mode, KeyInput::char('0'), "motion.line_start");
            self.bind(mode, KeyInput::char('^'), "motion.line_start");
            self.bind(mode, KeyInput::char('$'), "motion.line_end");
            self.bind(mode, KeyInput::plain(Key::Home), "motion.line_start");
            self.bind(mode, KeyInput::plain(Key::End), "motion.line_end");
            self.bind(mode, KeyInput::char('G'), "motion.last_row");
            self.bind(mode, KeyInput::char('{'), "motion.paragraph_backward");
            self.bind(mode, KeyInput::char('}'), "motion.paragraph_forward");
            self.bind(mode, KeyInput::ctrl('u'), "motion.half_page_up");
            self.bind(mode, KeyInput::ctrl('d'), "motion.half_page_down");
            self.bind(mode, KeyInput::ctrl('b'), "motion.page_up");
            self.bind(mode, KeyInput::ctrl('f'), "motion.page_down");
            self.bind(mode, KeyInput::plain(Key::PageUp), "motion.page_up");
            self.bind(mode, KeyInput::plain(Key::PageDown), "motion.page_down");
            self.bind(mode, KeyInput::char('g'), "prefix.g");
            self.bind(mode, KeyInput::char('r'), "prefix.replace");
            self.bind(mode, KeyInput::plain(Key::Escape), "cancel");
        }

        // Normal-only editing keys.
        self.bind(Normal, KeyInput::char('d'), "operator.delete");
        self.bind(Normal, KeyInput::char('c'), "operator.change");
        self.bind(Normal, KeyInput::char('y'), "operator.yank");
        self.bind(Normal, KeyInput::char('x'), "edit.clear_cell");
        self.bind(Normal, KeyInput::plain(Key::Delete), "edit.clear_cell");
        self.bind(Normal, KeyInput::char('p'), "paste.after");
        self.bind(Normal, KeyInput::char('P'), "paste.before");
        self.bind(Normal, KeyInput::char('u'), "history.undo");
        self.bind(Normal, KeyInput::ctrl('r'), "history.redo");
        self.bind(Normal, KeyInput::char('.'), "repeat.last_change");
        self.bind(Normal, KeyInput::char('i'), "insert.enter");
        self.bind(Normal, KeyInput::char('a'), "insert.append");
        self.bind(Normal, KeyInput::char('I'), "insert.line_start");
        self.bind(Normal, KeyInput::char('A'), "insert.line_end");
        self.bind(Normal, KeyInput::char('o'), "insert.open_below");
        self.bind(Normal, KeyInput::char('O'), "insert.open_above");
        self.bind(Normal, KeyInput::char('v'), "visual.character");
        self.bind(Normal, KeyInput::char('V'), "visual.line");
        self.bind(Normal, KeyInput::ctrl('v'), "visual.block");
        self.bind(Normal, KeyInput::char(':'), "command.ex");
        self.bind(Normal, KeyInput::char('/'), "command.search_forward");
        self.bind(Normal, KeyInput::char('?'), "command.search_backward");
        self.bind(Normal, KeyInput::char('n'), "search.next");
        self.bind(Normal, KeyInput::char('N'), "search.previous");

        // Visual-only: operators act on the range, `o` swaps anchor/head.
        self.bind(Visual, KeyInput::char('d'), "visual.delete");
        self.bind(Visual, KeyInput::char('x'), "visual.delete");
        self.bind(Visual, KeyInput::char('y'), "visual.yank");
        self.bind(Visual, KeyInput::char('c'), "visual.change");
        self.bind(Visual, KeyInput::char('p'), "visual.paste");
        self.bind(Visual, KeyInput::char('o'), "visual.swap_anchor");
        self.bind(Visual, KeyInput::char('v'), "visual.character");
        self.bind(Visual, KeyInput::char('V'), "visual.line");
        self.bind(Visual, KeyInput::ctrl('v'), "visual.block");

        // Insert mode: everything except text entry is remappable; unbound
        // printable keys always type into the scratch buffer.
        self.bind(Insert, KeyInput::plain(Key::Escape), "insert.commit");
        self.bind(Insert, KeyInput::plain(Key::Enter), "insert.commit");
        self.bind(Insert, KeyInput::ctrl('c'), "insert.cancel");
        self.bind(Insert, KeyInput::plain(Key::Backspace), "insert.backspace");
        self.bind(Insert, KeyInput::plain(Key::Delete), "insert.delete");
        self.bind(Insert, KeyInput::plain(Key::Left), "insert.caret_left");
        self.bind(Insert, KeyInput::plain(Key::Right), "insert.caret_right");
        self.bind(Insert, KeyInput::plain(Key::Home), "insert.caret_start");
        self.bind(Insert, KeyInput::plain(Key::End), "insert.caret_end");

        // Command mode: the mini-line; unbound printable keys append.
        self.bind(Command, KeyInput::plain(Key::Escape), "command.cancel");
        self.bind(Command, KeyInput::plain(Key::Enter), "command.commit");
        self.bind(Command, KeyInput::plain(Key::Backspace), "command.backspace");
    }

    pub fn bind(&mut self, mode: MapMode, input: KeyInput, action: impl Into<String>) {
        self.map.insert((mode, input), action.into());
    }

    pub fn unbind(&mut self, mode: MapMode, input: KeyInput) {
        self.map.remove(&(mode, input));
    }

    pub fn action_for(&self, mode: MapMode, input: &KeyInput) -> Option<&str> {
        self.map.get(&(mode, *input)).map(String::as_str)
    }

    /// Replace the table with the defaults plus the given overrides, the
    /// runtime-reload path. Unparseable key specs are skipped with a warning.
    pub fn reload<'a>(&mut self, overrides: impl IntoIterator<Item = (MapMode, &'a str, &'a str)>) {
        self.map.clear();
        self.install_defaults();
        for (mode, spec, action) in overrides {
            match KeyInput::parse(spec) {
                Some(input) => self.bind(mode, input, action),
                None => log::warn!("skipping binding with bad key spec: {spec}"),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::default_bindings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_specs() {
        assert_eq!(KeyInput::parse("j"), Some(KeyInput::char('j')));
        assert_eq!(KeyInput::parse("ctrl+v"), Some(KeyInput::ctrl('v')));
        assert_eq!(KeyInput::parse("escape"), Some(KeyInput::plain(Key::Escape)));
        assert_eq!(
            KeyInput::parse("ctrl+alt+x"),
            Some(KeyInput::new(
                Key::Char('x'),
                Modifiers {
                    ctrl: true,
                    alt: true,
                    shift: false
                }
            ))
        );
        assert_eq!(KeyInput::parse("bogus"), None);
    }

    #[test]
    fn test_display_round_trips_parse() {
        for spec in ["j", "ctrl+v", "escape", "pagedown", "ctrl+alt+x"] {
            let input = KeyInput::parse(spec).unwrap();
            assert_eq!(KeyInput::parse(&input.to_string()), Some(input));
        }
    }

    #[test]
    fn test_default_table_lookup() {
        let bindings = KeyBindings::default_bindings();
        assert_eq!(
            bindings.action_for(MapMode::Normal, &KeyInput::char('j')),
            Some("motion.down")
        );
        assert_eq!(
            bindings.action_for(MapMode::Visual, &KeyInput::char('o')),
            Some("visual.swap_anchor")
        );
        assert_eq!(
            bindings.action_for(MapMode::Normal, &KeyInput::ctrl('v')),
            Some("visual.block")
        );
        assert_eq!(
            bindings.action_for(MapMode::Insert, &KeyInput::plain(Key::Escape)),
            Some("insert.commit")
        );
        assert_eq!(
            bindings.action_for(MapMode::Insert, &KeyInput::ctrl('c')),
            Some("insert.cancel")
        );
        assert_eq!(
            bindings.action_for(MapMode::Command, &KeyInput::plain(Key::Enter)),
            Some("command.commit")
        );
        assert_eq!(bindings.action_for(MapMode::Normal, &KeyInput::char('Q')), None);
        // Plain characters are deliberately unbound in Insert/Command: they
        // fall through to text entry.
        assert_eq!(bindings.action_for(MapMode::Insert, &KeyInput::char('x')), None);
        assert_eq!(bindings.action_for(MapMode::Command, &KeyInput::char('w')), None);
    }

    #[test]
    fn test_reload_applies_overrides_over_defaults() {
        let mut bindings = KeyBindings::default_bindings();
        bindings.reload([(MapMode::Normal, "s", "edit.clear_cell")]);
        assert_eq!(
            bindings.action_for(MapMode::Normal, &KeyInput::char('s')),
            Some("edit.clear_cell")
        );
        // Defaults survive a reload.
        assert_eq!(
            bindings.action_for(MapMode::Normal, &KeyInput::char('j')),
            Some("motion.down")
        );
    }

    #[test]
    fn test_typed_char_excludes_chords() {
        assert_eq!(KeyInput::char('a').typed_char(), Some('a'));
        assert_eq!(KeyInput::ctrl('a').typed_char(), None);
        assert_eq!(KeyInput::plain(Key::Enter).typed_char(), None);
    }
}

//! Search commit and stepping, plus the match-flag projection.

use crate::controller::EditorController;
use crate::events::EditorEvent;

impl EditorController {
    /// Commit a `/pattern` (forward) or `?pattern` (backward) search: find
    /// everything, land on the nearest match in the search direction with
    /// wraparound, and light the flags.
    pub(crate) fn commit_search(&mut self, pattern: &str, forward: bool) {
        if pattern.is_empty() {
            return;
        }
        let case_sensitive = self.config.case_sensitive_search;
        let matches = match self.document.find_matches(pattern, false, case_sensitive) {
            Ok(matches) => matches,
            Err(e) => {
                self.set_status(e.to_string());
                Vec::new()
            }
        };
        self.state.search.pattern = pattern.to_string();
        self.state.search.matches = matches;

        if self.state.search.matches.is_empty() {
            self.state.search.current = None;
            self.refresh_search_flags();
            self.emit(EditorEvent::SearchChanged {
                pattern: pattern.to_string(),
                match_count: 0,
            });
            self.set_status(format!("pattern not found: {pattern}"));
            return;
        }

        let cursor = self.state.cursor;
        let index = if forward {
            self.state
                .search
                .matches
                .iter()
                .position(|p| *p >= cursor)
                .unwrap_or(0)
        } else {
            self.state
                .search
                .matches
                .iter()
                .rposition(|p| *p <= cursor)
                .unwrap_or(self.state.search.matches.len() - 1)
        };
        self.focus_match(index);
        let count = self.state.search.matches.len();
        self.emit(EditorEvent::SearchChanged {
            pattern: pattern.to_string(),
            match_count: count,
        });
    }

    /// `n` / `N`: step through the committed matches with wraparound.
    pub(crate) fn step_search(&mut self, forward: bool) {
        let len = self.state.search.matches.len();
        if len == 0 {
            if self.state.search.pattern.is_empty() {
                self.set_status("no previous search");
            } else {
                let pattern = self.state.search.pattern.clone();
                self.set_status(format!("pattern not found: {pattern}"));
            }
            return;
        }
        let current = self.state.search.current.unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.focus_match(next);
    }

    fn focus_match(&mut self, index: usize) {
        self.state.search.current = Some(index);
        let target = self.state.search.matches[index];
        self.move_cursor(target);
        self.refresh_search_flags();
    }

    /// Re-derive `is_search_match` / `is_current_search_match`. The
    /// previously flagged cells are remembered so the sweep is bounded by the
    /// match count, not the grid size.
    pub(crate) fn refresh_search_flags(&mut self) {
        for pos in std::mem::take(&mut self.search_flags) {
            self.document.set_search_match(pos, false);
            self.document.set_current_search_match(pos, false);
        }
        self.search_flags = self.state.search.matches.clone();
        let current = self.state.search.current_position();
        for pos in &self.search_flags {
            // The focused match carries only the "current" flag; the rest
            // carry the plain match flag.
            if Some(*pos) == current {
                self.document.set_current_search_match(*pos, true);
            } else {
                self.document.set_search_match(*pos, true);
            }
        }
    }

    /// Drop the committed search entirely (`:nohlsearch` analogue used when a
    /// document is reloaded).
    pub fn clear_search(&mut self) {
        self.state.search.clear();
        self.refresh_search_flags();
        self.emit(EditorEvent::SearchChanged {
            pattern: String::new(),
            match_count: 0,
        });
    }
}

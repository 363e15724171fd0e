//! The one component a display surface talks to.
//!
//! Each [`EditorEvent`] is handled to completion: the buffer is mutated, the
//! edit is logged for undo, and the completion list is refreshed from the
//! word in front of the cursor. The surface then renders the returned
//! [`EditOutcome`].

use crate::autocomplete::AutocompleteIndex;
use crate::buffer::TextBuffer;
use crate::error::{BoundsPolicy, EditError};
use crate::highlight::{HighlightSpan, Highlighter};
use crate::history::{EditAction, EditHistory, EditKind};
use crate::keywords::PYTHON_KEYWORDS;
use crate::position::{self, CursorPosition};
use crate::search;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// A typed character. Whitespace also closes the word before it.
    Insert(char),
    Backspace,
    /// Cycles the suggestion selection while suggestions are showing,
    /// otherwise moves the cursor a line.
    Navigate(Direction),
    Undo,
    Redo,
    /// Where the surface placed the cursor. `line` is 1-based.
    CursorReport { line: usize, column: usize },
    /// Swaps the partial word at the cursor for the selected suggestion.
    AcceptSuggestion,
}

/// What the surface needs after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub text: String,
    pub suggestions: Vec<String>,
    pub selected: Option<usize>,
    pub cursor: usize,
    /// Bumped on every event. Anything computed for an older revision is
    /// stale.
    pub revision: u64,
    /// Informational only: empty history, or a position rejected under
    /// [`BoundsPolicy::Strict`].
    pub notice: Option<EditError>,
}

#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    pub bounds: BoundsPolicy,
    pub max_suggestions: usize,
    /// Words the completion index and the keyword highlighter start with.
    pub vocabulary: Vec<String>,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            bounds: BoundsPolicy::Clamp,
            max_suggestions: 5,
            vocabulary: PYTHON_KEYWORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

pub struct EditCoordinator {
    buffer: TextBuffer,
    history: EditHistory,
    index: AutocompleteIndex,
    highlighter: Highlighter,
    options: CoordinatorOptions,
    cursor: usize,
    suggestions: Vec<String>,
    selected: Option<usize>,
    revision: u64,
    modified: bool,
}

impl EditCoordinator {
    pub fn new(options: CoordinatorOptions) -> Self {
        let index = AutocompleteIndex::with_vocabulary(&options.vocabulary);
        let highlighter = Highlighter::new(&options.vocabulary);
        log::debug!(
            "Coordinator ready with {} vocabulary words ({:?} bounds)",
            index.len(),
            options.bounds
        );

        Self {
            buffer: TextBuffer::new(),
            history: EditHistory::new(),
            index,
            highlighter,
            options,
            cursor: 0,
            suggestions: Vec::new(),
            selected: None,
            revision: 0,
            modified: false,
        }
    }

    pub fn apply_event(&mut self, event: EditorEvent) -> EditOutcome {
        self.revision += 1;
        log::trace!("event {:?} at {} (rev {})", event, self.cursor, self.revision);

        let notice = match event {
            EditorEvent::Insert(ch) => self.type_char(ch),
            EditorEvent::Backspace => self.backspace(),
            EditorEvent::Navigate(direction) => {
                self.navigate(direction);
                None
            }
            EditorEvent::Undo => self.undo(),
            EditorEvent::Redo => self.redo(),
            EditorEvent::CursorReport { line, column } => {
                self.move_cursor(CursorPosition::new(line, column));
                None
            }
            EditorEvent::AcceptSuggestion => self.accept_suggestion(),
        };

        if let Some(notice) = &notice {
            log::debug!("{}", notice);
        }
        self.outcome(notice)
    }

    pub fn current_text(&self) -> String {
        self.buffer.text()
    }

    pub fn query_suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Position of the highlighted entry in [`query_suggestions`](Self::query_suggestions).
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_suggestion(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.suggestions.get(i))
            .map(String::as_str)
    }

    /// Completions for an arbitrary prefix, uncapped.
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        self.index.complete(prefix)
    }

    pub fn index(&self) -> &AutocompleteIndex {
        &self.index
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cursor_position(&self) -> CursorPosition {
        position::line_column(&self.buffer.text(), self.cursor)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn highlights(&self) -> Vec<HighlightSpan> {
        self.highlighter.highlight(&self.buffer.text())
    }

    pub fn search(&self, term: &str) -> Vec<HighlightSpan> {
        search::find_all(&self.buffer.text(), term)
    }

    /// Replaces the document. History and cursor reset; the completion
    /// vocabulary carries over.
    pub fn load(&mut self, text: &str) {
        self.buffer.replace(text);
        self.history.clear();
        self.cursor = 0;
        self.clear_suggestions();
        self.modified = false;
        self.revision += 1;
        log::debug!("Loaded {} characters", self.buffer.len());
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_current(&self, revision: u64) -> bool {
        revision == self.revision
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    fn outcome(&self, notice: Option<EditError>) -> EditOutcome {
        EditOutcome {
            text: self.buffer.text(),
            suggestions: self.suggestions.clone(),
            selected: self.selected,
            cursor: self.cursor,
            revision: self.revision,
            notice,
        }
    }

    fn type_char(&mut self, ch: char) -> Option<EditError> {
        if ch.is_control() && ch != '\n' && ch != '\t' {
            return None;
        }

        if ch.is_whitespace() {
            self.commit_word();
        }

        let index = self.cursor;
        match self.insert_at(index, ch) {
            Ok(landed) => {
                self.history.record(EditAction::insert(landed, ch));
                self.cursor = landed + 1;
                self.modified = true;
                self.refresh_suggestions();
                None
            }
            Err(e) => Some(e),
        }
    }

    fn backspace(&mut self) -> Option<EditError> {
        if self.cursor == 0 {
            return None;
        }

        let index = self.cursor - 1;
        match self.delete_at(index) {
            Ok(Some(removed)) => {
                self.history.record(EditAction::delete(index, removed));
                self.cursor = index;
                self.modified = true;
                self.refresh_suggestions();
                None
            }
            Ok(None) => None,
            Err(e) => Some(e),
        }
    }

    fn navigate(&mut self, direction: Direction) {
        if !self.suggestions.is_empty() {
            let count = self.suggestions.len();
            let current = self.selected.unwrap_or(0);
            self.selected = Some(match direction {
                Direction::Down => (current + 1) % count,
                Direction::Up => (current + count - 1) % count,
            });
            return;
        }

        let text = self.buffer.text();
        let here = position::line_column(&text, self.cursor);
        let line = match direction {
            Direction::Up if here.line > 1 => here.line - 1,
            Direction::Down if here.line < position::line_count(&text) => here.line + 1,
            _ => return,
        };
        self.cursor = position::flat_index(&text, CursorPosition::new(line, here.column));
    }

    /// Moving the cursor edits nothing, so any open suggestion list closes
    /// rather than following the cursor.
    fn move_cursor(&mut self, target: CursorPosition) {
        self.cursor = position::flat_index(&self.buffer.text(), target);
        self.clear_suggestions();
    }

    fn undo(&mut self) -> Option<EditError> {
        let action = match self.history.undo() {
            Ok(action) => action,
            Err(e) => return Some(e),
        };

        if self.apply(action.inverse()) {
            self.history.note_redo(action);
        } else {
            log::warn!("Dropping {:?}: it no longer matches the buffer", action);
        }
        self.refresh_suggestions();
        None
    }

    fn redo(&mut self) -> Option<EditError> {
        let action = match self.history.redo() {
            Ok(action) => action,
            Err(e) => return Some(e),
        };

        if self.apply(action) {
            self.history.note_replayed(action);
        } else {
            log::warn!("Dropping {:?}: it no longer matches the buffer", action);
        }
        self.refresh_suggestions();
        None
    }

    /// Plays one action against the buffer without logging it. Returns
    /// whether the buffer changed the way the action describes.
    fn apply(&mut self, action: EditAction) -> bool {
        match action.kind {
            EditKind::Insert => match self.insert_at(action.position, action.ch) {
                Ok(landed) => {
                    self.cursor = landed + 1;
                    self.modified = true;
                    landed == action.position
                }
                Err(_) => false,
            },
            EditKind::Delete => match self.delete_at(action.position) {
                Ok(Some(_)) => {
                    self.cursor = action.position;
                    self.modified = true;
                    true
                }
                _ => false,
            },
        }
    }

    fn accept_suggestion(&mut self) -> Option<EditError> {
        let word = match self.selected_suggestion() {
            Some(word) => word.to_string(),
            None => return None,
        };

        let text = self.buffer.text();
        let before = &text[..position::byte_offset(&text, self.cursor)];
        let partial_word = position::trailing_word(before);
        if partial_word == word {
            self.clear_suggestions();
            return None;
        }
        let partial = partial_word.chars().count();
        let start = self.cursor - partial;

        for _ in 0..partial {
            match self.delete_at(start) {
                Ok(Some(removed)) => self.history.record(EditAction::delete(start, removed)),
                Ok(None) => break,
                Err(e) => return Some(e),
            }
        }
        for (offset, ch) in word.chars().enumerate() {
            match self.insert_at(start + offset, ch) {
                Ok(landed) => self.history.record(EditAction::insert(landed, ch)),
                Err(e) => return Some(e),
            }
        }

        self.cursor = start + word.chars().count();
        self.modified = true;
        self.clear_suggestions();
        log::debug!("Completed {:?}", word);
        None
    }

    fn insert_at(&mut self, index: usize, ch: char) -> Result<usize, EditError> {
        match self.options.bounds {
            BoundsPolicy::Clamp => Ok(self.buffer.insert(index, ch)),
            BoundsPolicy::Strict => self.buffer.try_insert(index, ch),
        }
    }

    fn delete_at(&mut self, index: usize) -> Result<Option<char>, EditError> {
        match self.options.bounds {
            BoundsPolicy::Clamp => Ok(self.buffer.delete(index)),
            BoundsPolicy::Strict => self.buffer.try_delete(index).map(Some),
        }
    }

    /// Adds the word just before the cursor to the completion index.
    fn commit_word(&mut self) {
        let text = self.buffer.text();
        let before = &text[..position::byte_offset(&text, self.cursor)];
        let word = position::trailing_word(before);
        if self.index.insert(word) {
            log::debug!("Learned {:?}", word);
        }
    }

    fn refresh_suggestions(&mut self) {
        let text = self.buffer.text();
        let before = &text[..position::byte_offset(&text, self.cursor)];
        let partial = position::trailing_word(before);

        if partial.is_empty() {
            self.clear_suggestions();
            return;
        }

        let mut suggestions = self.index.complete(partial);
        suggestions.truncate(self.options.max_suggestions);
        self.selected = if suggestions.is_empty() { None } else { Some(0) };
        self.suggestions = suggestions;
    }

    fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.selected = None;
    }
}

impl Default for EditCoordinator {
    fn default() -> Self {
        Self::new(CoordinatorOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HistoryDirection;

    fn bare() -> EditCoordinator {
        EditCoordinator::new(CoordinatorOptions {
            vocabulary: Vec::new(),
            ..CoordinatorOptions::default()
        })
    }

    fn type_str(coordinator: &mut EditCoordinator, text: &str) -> EditOutcome {
        let mut last = None;
        for ch in text.chars() {
            last = Some(coordinator.apply_event(EditorEvent::Insert(ch)));
        }
        last.expect("typed at least one character")
    }

    #[test]
    fn test_typing_moves_cursor() {
        let mut coordinator = bare();
        let outcome = type_str(&mut coordinator, "abc");
        assert_eq!(outcome.text, "abc");
        assert_eq!(outcome.cursor, 3);
        assert!(coordinator.is_modified());
        assert!(coordinator.can_undo());
    }

    #[test]
    fn test_control_characters_are_ignored() {
        let mut coordinator = bare();
        let outcome = coordinator.apply_event(EditorEvent::Insert('\u{7}'));
        assert_eq!(outcome.text, "");
        assert!(!coordinator.can_undo());
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut coordinator = bare();
        let outcome = coordinator.apply_event(EditorEvent::Backspace);
        assert_eq!(outcome.text, "");
        assert_eq!(outcome.notice, None);
        assert!(!coordinator.can_undo());
    }

    #[test]
    fn test_cursor_report_then_insert() {
        let mut coordinator = bare();
        coordinator.load("ab\ncde");
        coordinator.apply_event(EditorEvent::CursorReport { line: 2, column: 1 });
        assert_eq!(coordinator.cursor(), 4);

        let outcome = coordinator.apply_event(EditorEvent::Insert('X'));
        assert_eq!(outcome.text, "ab\ncXde");
        assert_eq!(coordinator.cursor_position(), CursorPosition::new(2, 2));
    }

    #[test]
    fn test_whitespace_commits_word_before_cursor() {
        let mut coordinator = bare();
        type_str(&mut coordinator, "hello world ");
        assert!(coordinator.index().contains("hello"));
        assert!(coordinator.index().contains("world"));

        // A word is only committed once a boundary follows it.
        type_str(&mut coordinator, "pending");
        assert!(!coordinator.index().contains("pending"));
    }

    #[test]
    fn test_suggestions_follow_partial_word() {
        let mut coordinator = bare();
        type_str(&mut coordinator, "house horse ");
        let outcome = type_str(&mut coordinator, "ho");
        assert_eq!(outcome.suggestions, vec!["house", "horse"]);
        assert_eq!(outcome.selected, Some(0));

        let outcome = coordinator.apply_event(EditorEvent::Insert(' '));
        assert!(outcome.suggestions.is_empty());
        assert_eq!(outcome.selected, None);
    }

    #[test]
    fn test_suggestions_are_capped() {
        let mut coordinator = EditCoordinator::new(CoordinatorOptions {
            max_suggestions: 2,
            vocabulary: vec!["aa".into(), "ab".into(), "ac".into()],
            ..CoordinatorOptions::default()
        });
        let outcome = type_str(&mut coordinator, "a");
        assert_eq!(outcome.suggestions, vec!["aa", "ab"]);
        assert_eq!(coordinator.complete("a").len(), 3);
    }

    #[test]
    fn test_navigate_cycles_selection() {
        let mut coordinator = EditCoordinator::new(CoordinatorOptions {
            vocabulary: vec!["tea".into(), "ten".into(), "toe".into()],
            ..CoordinatorOptions::default()
        });
        type_str(&mut coordinator, "t");

        let up = coordinator.apply_event(EditorEvent::Navigate(Direction::Up));
        assert_eq!(up.selected, Some(2));
        let down = coordinator.apply_event(EditorEvent::Navigate(Direction::Down));
        assert_eq!(down.selected, Some(0));
        coordinator.apply_event(EditorEvent::Navigate(Direction::Down));
        assert_eq!(coordinator.selected_suggestion(), Some("ten"));
        assert_eq!(up.text, "t");
    }

    #[test]
    fn test_navigate_moves_between_lines() {
        let mut coordinator = bare();
        coordinator.load("abcd\nxy\nlonger");
        coordinator.apply_event(EditorEvent::CursorReport { line: 1, column: 3 });

        let outcome = coordinator.apply_event(EditorEvent::Navigate(Direction::Down));
        // Column clamps to the shorter line.
        assert_eq!(outcome.cursor, 7);
        coordinator.apply_event(EditorEvent::Navigate(Direction::Down));
        assert_eq!(coordinator.cursor_position(), CursorPosition::new(3, 2));
        coordinator.apply_event(EditorEvent::Navigate(Direction::Down));
        assert_eq!(coordinator.cursor_position(), CursorPosition::new(3, 2));

        coordinator.apply_event(EditorEvent::Navigate(Direction::Up));
        coordinator.apply_event(EditorEvent::Navigate(Direction::Up));
        assert_eq!(coordinator.cursor_position(), CursorPosition::new(1, 2));
    }

    #[test]
    fn test_accept_suggestion_replaces_partial_word() {
        let mut coordinator = bare();
        type_str(&mut coordinator, "print ");
        type_str(&mut coordinator, "pr");

        let outcome = coordinator.apply_event(EditorEvent::AcceptSuggestion);
        assert_eq!(outcome.text, "print print");
        assert_eq!(outcome.cursor, 11);
        assert!(outcome.suggestions.is_empty());

        // Undo peels the completion back one character at a time.
        for _ in 0..5 {
            coordinator.apply_event(EditorEvent::Undo);
        }
        assert_eq!(coordinator.current_text(), "print ");
        coordinator.apply_event(EditorEvent::Undo);
        assert_eq!(coordinator.current_text(), "print r");
        coordinator.apply_event(EditorEvent::Undo);
        assert_eq!(coordinator.current_text(), "print pr");
    }

    #[test]
    fn test_accept_without_selection_is_noop() {
        let mut coordinator = bare();
        type_str(&mut coordinator, "zz");
        let outcome = coordinator.apply_event(EditorEvent::AcceptSuggestion);
        assert_eq!(outcome.text, "zz");
        assert_eq!(outcome.cursor, 2);
    }

    #[test]
    fn test_accept_complete_word_changes_nothing() {
        let mut coordinator = EditCoordinator::new(CoordinatorOptions {
            vocabulary: vec!["None".into()],
            ..CoordinatorOptions::default()
        });
        type_str(&mut coordinator, "None");
        coordinator.mark_saved();
        let undo_depth = coordinator.history.undo_len();
        assert_eq!(coordinator.selected_suggestion(), Some("None"));

        let outcome = coordinator.apply_event(EditorEvent::AcceptSuggestion);
        assert_eq!(outcome.text, "None");
        assert!(outcome.suggestions.is_empty());
        assert_eq!(coordinator.history.undo_len(), undo_depth);
        assert!(!coordinator.is_modified());
    }

    #[test]
    fn test_cursor_report_closes_suggestions() {
        let mut coordinator = EditCoordinator::default();
        coordinator.load("x = None\nsecond line");

        let outcome = coordinator.apply_event(EditorEvent::CursorReport {
            line: 1,
            column: usize::MAX,
        });
        assert_eq!(outcome.cursor, 8);
        assert!(outcome.suggestions.is_empty());

        // With no list open, Down moves to the next line.
        coordinator.apply_event(EditorEvent::Navigate(Direction::Down));
        assert_eq!(coordinator.cursor_position(), CursorPosition::new(2, 8));

        let outcome = coordinator.apply_event(EditorEvent::Insert('\n'));
        assert_eq!(outcome.text, "x = None\nsecond l\nine");
        assert!(coordinator.can_undo());
    }

    #[test]
    fn test_undo_redo_notices() {
        let mut coordinator = bare();
        assert_eq!(
            coordinator.apply_event(EditorEvent::Undo).notice,
            Some(EditError::EmptyHistory(HistoryDirection::Undo))
        );
        assert_eq!(
            coordinator.apply_event(EditorEvent::Redo).notice,
            Some(EditError::EmptyHistory(HistoryDirection::Redo))
        );
    }

    #[test]
    fn test_undo_places_cursor() {
        let mut coordinator = bare();
        type_str(&mut coordinator, "abc");
        coordinator.apply_event(EditorEvent::CursorReport { line: 1, column: 1 });
        coordinator.apply_event(EditorEvent::Backspace);
        assert_eq!(coordinator.current_text(), "bc");

        let outcome = coordinator.apply_event(EditorEvent::Undo);
        assert_eq!(outcome.text, "abc");
        assert_eq!(outcome.cursor, 1);

        let outcome = coordinator.apply_event(EditorEvent::Redo);
        assert_eq!(outcome.text, "bc");
        assert_eq!(outcome.cursor, 0);
    }

    #[test]
    fn test_undo_keeps_learned_words() {
        let mut coordinator = bare();
        type_str(&mut coordinator, "typed ");
        for _ in 0..6 {
            coordinator.apply_event(EditorEvent::Undo);
        }
        assert_eq!(coordinator.current_text(), "");
        assert!(coordinator.index().contains("typed"));
    }

    #[test]
    fn test_load_resets_history_and_cursor() {
        let mut coordinator = bare();
        type_str(&mut coordinator, "draft");
        coordinator.load("fresh");

        assert_eq!(coordinator.current_text(), "fresh");
        assert_eq!(coordinator.cursor(), 0);
        assert!(!coordinator.can_undo());
        assert!(!coordinator.is_modified());
        assert_eq!(
            coordinator.apply_event(EditorEvent::Undo).notice,
            Some(EditError::EmptyHistory(HistoryDirection::Undo))
        );
    }

    #[test]
    fn test_revisions_increase() {
        let mut coordinator = bare();
        let first = coordinator.apply_event(EditorEvent::Insert('a'));
        let second = coordinator.apply_event(EditorEvent::Navigate(Direction::Up));
        assert!(second.revision > first.revision);
        assert!(!coordinator.is_current(first.revision));
        assert!(coordinator.is_current(second.revision));
    }

    #[test]
    fn test_modified_flag() {
        let mut coordinator = bare();
        assert!(!coordinator.is_modified());
        coordinator.apply_event(EditorEvent::Insert('a'));
        assert!(coordinator.is_modified());
        coordinator.mark_saved();
        assert!(!coordinator.is_modified());
    }

    #[test]
    fn test_highlights_and_search_see_current_text() {
        let mut coordinator = EditCoordinator::default();
        type_str(&mut coordinator, "if x: # Check");
        let kinds: Vec<_> = coordinator.highlights().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                crate::highlight::HighlightKind::Keyword,
                crate::highlight::HighlightKind::Comment
            ]
        );
        assert_eq!(coordinator.search("check").len(), 1);
    }
}

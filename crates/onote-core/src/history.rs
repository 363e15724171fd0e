use serde::{Deserialize, Serialize};

use crate::error::{EditError, HistoryDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    Insert,
    Delete,
}

/// One character inserted at, or removed from, one flat index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditAction {
    pub kind: EditKind,
    pub position: usize,
    pub ch: char,
}

impl EditAction {
    pub fn insert(position: usize, ch: char) -> Self {
        Self {
            kind: EditKind::Insert,
            position,
            ch,
        }
    }

    pub fn delete(position: usize, ch: char) -> Self {
        Self {
            kind: EditKind::Delete,
            position,
            ch,
        }
    }

    /// The action that cancels this one: same position and character, kind
    /// flipped.
    pub fn inverse(self) -> Self {
        let kind = match self.kind {
            EditKind::Insert => EditKind::Delete,
            EditKind::Delete => EditKind::Insert,
        };
        Self { kind, ..self }
    }
}

/// Undo and redo stacks of atomic edits, most recent last.
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    undo_stack: Vec<EditAction>,
    redo_stack: Vec<EditAction>,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs a fresh edit. Anything waiting to be redone is discarded.
    pub fn record(&mut self, action: EditAction) {
        self.undo_stack.push(action);
        self.redo_stack.clear();
    }

    /// Pops the edit to undo. The caller applies its inverse and hands the
    /// action back through [`note_redo`](Self::note_redo).
    pub fn undo(&mut self) -> Result<EditAction, EditError> {
        self.undo_stack
            .pop()
            .ok_or(EditError::EmptyHistory(HistoryDirection::Undo))
    }

    pub fn note_redo(&mut self, action: EditAction) {
        self.redo_stack.push(action);
    }

    /// Pops the edit to replay. The caller re-applies it and hands it back
    /// through [`note_replayed`](Self::note_replayed).
    pub fn redo(&mut self) -> Result<EditAction, EditError> {
        self.redo_stack
            .pop()
            .ok_or(EditError::EmptyHistory(HistoryDirection::Redo))
    }

    /// Puts a replayed edit back on the undo stack. Unlike
    /// [`record`](Self::record) this keeps the rest of the redo stack, so a
    /// run of redos walks forward through the same states.
    pub fn note_replayed(&mut self, action: EditAction) {
        self.undo_stack.push(action);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_flips_kind_only() {
        let action = EditAction::insert(3, 'q');
        assert_eq!(action.inverse(), EditAction::delete(3, 'q'));
        assert_eq!(action.inverse().inverse(), action);
    }

    #[test]
    fn test_empty_history() {
        let mut history = EditHistory::new();
        assert_eq!(
            history.undo(),
            Err(EditError::EmptyHistory(HistoryDirection::Undo))
        );
        assert_eq!(
            history.redo(),
            Err(EditError::EmptyHistory(HistoryDirection::Redo))
        );
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_then_redo_cycle() {
        let mut history = EditHistory::new();
        history.record(EditAction::insert(0, 'a'));
        history.record(EditAction::insert(1, 'b'));

        let last = history.undo().unwrap();
        assert_eq!(last, EditAction::insert(1, 'b'));
        history.note_redo(last);
        let first = history.undo().unwrap();
        history.note_redo(first);
        assert_eq!(history.redo_len(), 2);

        let replay = history.redo().unwrap();
        assert_eq!(replay, EditAction::insert(0, 'a'));
        history.note_replayed(replay);
        assert_eq!(history.redo_len(), 1);
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_record_invalidates_redo() {
        let mut history = EditHistory::new();
        history.record(EditAction::insert(0, 'a'));
        let action = history.undo().unwrap();
        history.note_redo(action);
        assert!(history.can_redo());

        history.record(EditAction::insert(0, 'z'));
        assert!(!history.can_redo());
        assert_eq!(
            history.redo(),
            Err(EditError::EmptyHistory(HistoryDirection::Redo))
        );
    }

    #[test]
    fn test_clear() {
        let mut history = EditHistory::new();
        history.record(EditAction::delete(0, 'x'));
        history.note_redo(EditAction::insert(4, 'y'));
        history.clear();
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 0);
    }
}

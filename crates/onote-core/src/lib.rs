//! Editing engine behind Onote.
//!
//! The engine owns the document text, its undo/redo log and the word
//! completion index. A front end feeds it [`EditorEvent`]s through an
//! [`EditCoordinator`] and renders whatever [`EditOutcome`] comes back.

pub mod autocomplete;
pub mod buffer;
pub mod coordinator;
pub mod error;
pub mod highlight;
pub mod history;
pub mod keywords;
pub mod position;
pub mod search;

pub use autocomplete::AutocompleteIndex;
pub use buffer::TextBuffer;
pub use coordinator::{CoordinatorOptions, Direction, EditCoordinator, EditOutcome, EditorEvent};
pub use error::{BoundsPolicy, EditError, HistoryDirection};
pub use highlight::{HighlightKind, HighlightSpan, Highlighter};
pub use history::{EditAction, EditHistory, EditKind};
pub use position::CursorPosition;

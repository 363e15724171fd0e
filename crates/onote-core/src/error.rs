use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which side of the history a failed request targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Undo,
    Redo,
}

impl fmt::Display for HistoryDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryDirection::Undo => write!(f, "undo"),
            HistoryDirection::Redo => write!(f, "redo"),
        }
    }
}

/// Conditions the engine reports instead of failing.
///
/// None of these are fatal. The coordinator absorbs them and hands them to
/// the front end as informational notices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("Position {position} is out of range (length {len})")]
    OutOfRange { position: usize, len: usize },

    #[error("Nothing to {0}.")]
    EmptyHistory(HistoryDirection),

    #[error("No completions for {0:?}")]
    NotFound(String),
}

/// How the coordinator treats positions past the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundsPolicy {
    /// Walk as far as the buffer goes and act there. Deletes past the end
    /// remove nothing.
    #[default]
    Clamp,
    /// Reject the edit with [`EditError::OutOfRange`].
    Strict,
}

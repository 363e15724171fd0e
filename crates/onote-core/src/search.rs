use regex::{Regex, RegexBuilder};

use crate::highlight::{HighlightKind, HighlightSpan};
use crate::position::CharOffsets;

fn matcher(term: &str) -> Option<Regex> {
    if term.is_empty() {
        return None;
    }
    match RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::warn!("Cannot search for {:?}: {}", term, e);
            None
        }
    }
}

/// Every non-overlapping, case-insensitive occurrence of `term`.
pub fn find_all(text: &str, term: &str) -> Vec<HighlightSpan> {
    let Some(regex) = matcher(term) else {
        return Vec::new();
    };

    let mut offsets = CharOffsets::new(text);
    regex
        .find_iter(text)
        .map(|m| {
            HighlightSpan::new(
                HighlightKind::SearchMatch,
                offsets.to_char(m.start()),
                offsets.to_char(m.end()),
            )
        })
        .collect()
}

/// First occurrence starting at or after char index `from`, wrapping around
/// to the top of the document when nothing follows.
pub fn find_next(text: &str, term: &str, from: usize) -> Option<HighlightSpan> {
    let matches = find_all(text, term);
    matches
        .iter()
        .find(|span| span.start >= from)
        .or_else(|| matches.first())
        .copied()
}

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::position::CharOffsets;

lazy_static! {
    // An unterminated string runs to the end of the text.
    static ref STRING_OR_COMMENT: Regex = Regex::new(r#"(?P<string>"[^"]*"?)|(?P<comment>#[^\n]*)"#)
        .expect("Invalid STRING_OR_COMMENT regex pattern");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightKind {
    Keyword,
    String,
    Comment,
    SearchMatch,
}

/// A styled range of the document in flat char indices, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub kind: HighlightKind,
    pub start: usize,
    pub end: usize,
}

impl HighlightSpan {
    pub fn new(kind: HighlightKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }
}

/// Finds keyword, string and comment ranges in a document.
#[derive(Debug, Clone)]
pub struct Highlighter {
    keywords: Option<Regex>,
}

impl Highlighter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = keywords
            .into_iter()
            .filter(|word| !word.as_ref().is_empty())
            .map(|word| regex::escape(word.as_ref()))
            .collect();

        if alternatives.is_empty() {
            return Self { keywords: None };
        }

        let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
        let keywords = match Regex::new(&pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                log::warn!("Keyword highlighting disabled: {}", e);
                None
            }
        };
        Self { keywords }
    }

    /// Spans sorted by start. Keywords inside strings or comments are not
    /// reported.
    pub fn highlight(&self, text: &str) -> Vec<HighlightSpan> {
        let mut spans = Vec::new();
        let mut quoted = Vec::new();
        let mut offsets = CharOffsets::new(text);

        for caps in STRING_OR_COMMENT.captures_iter(text) {
            let (kind, m) = match (caps.name("string"), caps.name("comment")) {
                (Some(m), _) => (HighlightKind::String, m),
                (None, Some(m)) => (HighlightKind::Comment, m),
                (None, None) => continue,
            };
            quoted.push(m.range());
            spans.push(HighlightSpan::new(
                kind,
                offsets.to_char(m.start()),
                offsets.to_char(m.end()),
            ));
        }

        if let Some(keywords) = &self.keywords {
            let mut offsets = CharOffsets::new(text);
            for m in keywords.find_iter(text) {
                if quoted
                    .iter()
                    .any(|range| m.start() < range.end && range.start < m.end())
                {
                    continue;
                }
                spans.push(HighlightSpan::new(
                    HighlightKind::Keyword,
                    offsets.to_char(m.start()),
                    offsets.to_char(m.end()),
                ));
            }
        }

        spans.sort_by_key(|span| span.start);
        spans
    }
}

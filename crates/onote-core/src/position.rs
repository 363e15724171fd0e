//! Conversions between flat character indices and the line/column pairs a
//! display surface reports.
//!
//! Indices count `char`s, not bytes. Lines are separated by `\n` only.

/// A cursor as the display surface reports it: `line` starts at 1, `column`
/// starts at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
}

impl CursorPosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for CursorPosition {
    fn default() -> Self {
        Self { line: 1, column: 0 }
    }
}

/// Flat index of `position` within `text`: the lengths of all preceding
/// lines plus one per line break, plus the column.
///
/// Line 0 is read as line 1. The column is clamped to the length of its
/// line, and a line past the last one lands at the end of the text.
pub fn flat_index(text: &str, position: CursorPosition) -> usize {
    let target = position.line.max(1);
    let mut index = 0;

    for (number, line) in text.split('\n').enumerate() {
        let len = line.chars().count();
        if number + 1 == target {
            return index + position.column.min(len);
        }
        index += len + 1;
    }

    // Ran out of lines; the last `+ 1` counted a break that isn't there.
    index.saturating_sub(1)
}

/// Inverse of [`flat_index`]. Indices past the end map to the end.
pub fn line_column(text: &str, index: usize) -> CursorPosition {
    let mut position = CursorPosition::default();
    for ch in text.chars().take(index) {
        if ch == '\n' {
            position.line += 1;
            position.column = 0;
        } else {
            position.column += 1;
        }
    }
    position
}

pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Byte offset of the `index`-th character, or `text.len()` past the end.
pub fn byte_offset(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

/// The run of non-whitespace characters at the end of `before_cursor`.
pub fn trailing_word(before_cursor: &str) -> &str {
    let start = before_cursor
        .char_indices()
        .rev()
        .find(|(_, ch)| ch.is_whitespace())
        .map(|(offset, ch)| offset + ch.len_utf8())
        .unwrap_or(0);
    &before_cursor[start..]
}

/// Turns byte offsets into char indices for a sequence of ascending offsets,
/// counting only the characters between consecutive calls.
pub(crate) struct CharOffsets<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharOffsets<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    pub(crate) fn to_char(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_index_second_line() {
        assert_eq!(flat_index("ab\ncde", CursorPosition::new(2, 3)), 6);
        assert_eq!(flat_index("ab\ncde", CursorPosition::new(2, 0)), 3);
        assert_eq!(flat_index("ab\ncde", CursorPosition::new(1, 2)), 2);
    }

    #[test]
    fn test_flat_index_clamps() {
        // Column past the line end stays on that line.
        assert_eq!(flat_index("ab\ncde", CursorPosition::new(1, 9)), 2);
        // Line past the end lands at the end of the text.
        assert_eq!(flat_index("ab\ncde", CursorPosition::new(7, 0)), 6);
        assert_eq!(flat_index("ab\ncde", CursorPosition::new(0, 1)), 1);
        assert_eq!(flat_index("", CursorPosition::new(1, 4)), 0);
    }

    #[test]
    fn test_flat_index_counts_chars() {
        assert_eq!(flat_index("日本\n語", CursorPosition::new(2, 1)), 4);
    }

    #[test]
    fn test_line_column_round_trip() {
        let text = "if x:\n    pass\n\nend";
        for index in 0..=text.chars().count() {
            let position = line_column(text, index);
            assert_eq!(flat_index(text, position), index);
        }
        assert_eq!(line_column(text, 100), CursorPosition::new(4, 3));
    }

    #[test]
    fn test_line_count() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("a\nb"), 2);
        assert_eq!(line_count("a\n"), 2);
    }

    #[test]
    fn test_trailing_word() {
        assert_eq!(trailing_word("import os"), "os");
        assert_eq!(trailing_word("import "), "");
        assert_eq!(trailing_word("whi"), "whi");
        assert_eq!(trailing_word("x = 世界"), "世界");
        assert_eq!(trailing_word("line\nnext"), "next");
        assert_eq!(trailing_word(""), "");
    }

    #[test]
    fn test_byte_offset() {
        assert_eq!(byte_offset("aé b", 2), 3);
        assert_eq!(byte_offset("ab", 5), 2);
    }

    #[test]
    fn test_char_offsets() {
        let text = "aé b日c";
        let mut offsets = CharOffsets::new(text);
        assert_eq!(offsets.to_char(0), 0);
        assert_eq!(offsets.to_char(3), 2);
        assert_eq!(offsets.to_char(5), 4);
        assert_eq!(offsets.to_char(text.len()), 6);
        // Going backwards restarts the count.
        assert_eq!(offsets.to_char(1), 1);
    }
}

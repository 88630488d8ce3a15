//! Text buffer abstraction over canonical text.
//!
//! The `TextBuffer` trait is the flat view of an editor buffer that the
//! session edits through; `EditableDocument` implements it over the node
//! tree, where `'\n'` stands for a hard break. `EditorRope` indexes plain
//! exported text by line.

use std::ops::Range;

use crate::types::EditInfo;

/// A text buffer that supports editing by char offset.
///
/// All offsets are in Unicode scalar values (chars), not bytes or UTF-16.
pub trait TextBuffer {
    /// Total length in chars.
    fn len_chars(&self) -> usize;

    /// Insert text at char offset.
    fn insert(&mut self, char_offset: usize, text: &str);

    /// Delete char range.
    fn delete(&mut self, char_range: Range<usize>);

    /// Info about the last edit operation, if any.
    fn last_edit(&self) -> Option<&EditInfo>;
}

/// Ropey-backed line index over plain template text.
#[derive(Clone, Default)]
pub struct EditorRope {
    rope: ropey::Rope,
}

impl EditorRope {
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
        }
    }

    /// Zero-based (line, column) of a char offset, clamped to the buffer.
    pub fn line_col(&self, char_offset: usize) -> (usize, usize) {
        let offset = char_offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        (line, offset - self.rope.line_to_char(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let rope = EditorRope::from_str("{% for a in a %}\r\n  {{ a.b }}\n{% endfor %}");
        // "{% for a in a %}" is 16 chars, then "\r\n".
        assert_eq!(rope.line_col(0), (0, 0));
        assert_eq!(rope.line_col(18), (1, 0));
        assert_eq!(rope.line_col(1000), (2, 12));
    }

    #[test]
    fn test_line_col_empty() {
        assert_eq!(EditorRope::default().line_col(3), (0, 0));
    }
}

//! Core editor types: offset selections and edit tracking.
//!
//! All offsets are canonical-text character offsets: text runs count their
//! chars, each hard break counts as one.

use std::ops::Range;

use web_time::Instant;

/// Text selection with anchor and head offsets.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// A zero-width selection (plain cursor).
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    pub fn is_backwards(&self) -> bool {
        self.head < self.anchor
    }
}

/// The most recent mutation of a document.
#[derive(Clone, Debug)]
pub struct EditInfo {
    /// Canonical offset where the edit occurred
    pub edit_char_pos: usize,
    pub inserted_len: usize,
    pub deleted_len: usize,
    /// Whether hard breaks were inserted or removed
    pub contains_break: bool,
    /// Canonical length after this edit was applied.
    /// A different current length means the document changed since.
    pub doc_len_after: usize,
    pub timestamp: Instant,
}

impl PartialEq for EditInfo {
    fn eq(&self, other: &Self) -> bool {
        // timestamp is not meaningful for equality
        self.edit_char_pos == other.edit_char_pos
            && self.inserted_len == other.inserted_len
            && self.deleted_len == other.deleted_len
            && self.contains_break == other.contains_break
            && self.doc_len_after == other.doc_len_after
    }
}

impl EditInfo {
    pub fn insertion(pos: usize, text: &str, doc_len_after: usize) -> Self {
        Self {
            edit_char_pos: pos,
            inserted_len: text.chars().count(),
            deleted_len: 0,
            contains_break: text.contains('\n'),
            doc_len_after,
            timestamp: Instant::now(),
        }
    }

    pub fn deletion(range: Range<usize>, contains_break: bool, doc_len_after: usize) -> Self {
        Self {
            edit_char_pos: range.start,
            inserted_len: 0,
            deleted_len: range.len(),
            contains_break,
            doc_len_after,
            timestamp: Instant::now(),
        }
    }

    /// Check if this edit info is stale (doc has changed since this edit).
    pub fn is_stale(&self, current_doc_len: usize) -> bool {
        self.doc_len_after != current_doc_len
    }

    /// Range of inserted text, or an empty range at the deletion point.
    pub fn affected_range(&self) -> Range<usize> {
        self.edit_char_pos..self.edit_char_pos + self.inserted_len
    }
}

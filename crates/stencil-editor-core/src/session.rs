//! Editor session: one document, one selection, focus state.
//!
//! The selection is stored as node anchors, like a host selection, and is
//! converted to canonical offsets on every read. Anything that mutates the
//! document out of band (a formatting host, direct tree edits) is therefore
//! picked up by the next read rather than trusting an offset captured
//! earlier.

use stencil_common::EditorConfig;

use crate::document::EditableDocument;
use crate::offset_map::{Anchor, anchor_of, offset_of};
use crate::text::TextBuffer;
use crate::types::{EditInfo, Selection};

/// Anchor-based selection. `anchor` is where it started, `focus` where the
/// caret is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorSelection {
    pub anchor: Anchor,
    pub focus: Anchor,
}

impl AnchorSelection {
    pub fn collapsed(at: Anchor) -> Self {
        Self {
            anchor: at.clone(),
            focus: at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    document: EditableDocument,
    selection: Option<AnchorSelection>,
    focused: bool,
    focusable: bool,
    config: EditorConfig,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_document(EditableDocument::new(), config)
    }

    pub fn with_document(document: EditableDocument, config: EditorConfig) -> Self {
        Self {
            document,
            selection: None,
            focused: false,
            focusable: true,
            config,
        }
    }

    /// A session that refuses focus. Editing operations on it do nothing.
    pub fn read_only(document: EditableDocument, config: EditorConfig) -> Self {
        Self {
            focusable: false,
            ..Self::with_document(document, config)
        }
    }

    pub fn document(&self) -> &EditableDocument {
        &self.document
    }

    /// Mutable access for out-of-band edits. The selection is kept as is and
    /// re-resolved on the next read.
    pub fn document_mut(&mut self) -> &mut EditableDocument {
        &mut self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    /// Focus the editor. Returns whether it now has focus.
    pub fn focus(&mut self) -> bool {
        if self.focusable {
            self.focused = true;
        }
        self.focused
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn anchor_selection(&self) -> Option<&AnchorSelection> {
        self.selection.as_ref()
    }

    /// Current selection in canonical offsets, read from the live anchors.
    pub fn selection(&self) -> Option<Selection> {
        let sel = self.selection.as_ref()?;
        Some(Selection::new(
            offset_of(&self.document, &sel.anchor),
            offset_of(&self.document, &sel.focus),
        ))
    }

    pub fn cursor_offset(&self) -> Option<usize> {
        let sel = self.selection.as_ref()?;
        Some(offset_of(&self.document, &sel.focus))
    }

    /// Move a collapsed cursor to `offset` (clamped).
    ///
    /// An empty document gets an empty text run at its root first, so the
    /// cursor always has a concrete anchor.
    pub fn place_cursor(&mut self, offset: usize) {
        let anchor = match self.document.ensure_anchorable() {
            Some(anchor) => anchor,
            None => anchor_of(&self.document, offset),
        };
        tracing::trace!(target: "stencil::session", offset, ?anchor, "place cursor");
        self.selection = Some(AnchorSelection::collapsed(anchor));
    }

    /// Select the canonical range `anchor..head` (either order).
    pub fn select(&mut self, anchor: usize, head: usize) {
        self.document.ensure_anchorable();
        self.selection = Some(AnchorSelection {
            anchor: anchor_of(&self.document, anchor),
            focus: anchor_of(&self.document, head),
        });
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Cursor offset, placing the cursor at the end of the document first if
    /// there is no selection.
    pub fn ensure_cursor(&mut self) -> usize {
        if let Some(offset) = self.cursor_offset() {
            return offset;
        }
        let end = self.document.canonical_len();
        self.place_cursor(end);
        end
    }

    /// Delete a non-collapsed selection and collapse the cursor at its start.
    /// Returns the resulting cursor offset, if there is a selection.
    pub fn delete_selection(&mut self) -> Option<usize> {
        let sel = self.selection()?;
        if !sel.is_collapsed() {
            self.document.delete(sel.to_range());
            self.place_cursor(sel.start());
        }
        Some(sel.start())
    }

    /// Replace the selection with `text` and put the cursor right after it.
    /// Returns the char range of the inserted text.
    pub fn insert_text(&mut self, text: &str) -> std::ops::Range<usize> {
        self.ensure_cursor();
        let at = self.delete_selection().unwrap_or(0);
        self.document.insert(at, text);
        let inserted = self
            .document
            .last_edit()
            .filter(|edit| !edit.is_stale(self.document.len_chars()))
            .map_or(at..at, EditInfo::affected_range);
        self.place_cursor(inserted.end);
        inserted
    }

    /// The template as plain text.
    pub fn export_text(&self) -> String {
        self.document.canonical_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ContainerKind, Segment};

    fn session(text: &str) -> EditorSession {
        EditorSession::with_document(EditableDocument::from_text(text), EditorConfig::default())
    }

    #[test]
    fn test_place_cursor_clamps() {
        let mut s = session("hello");
        s.place_cursor(3);
        assert_eq!(s.cursor_offset(), Some(3));
        assert_eq!(s.selection(), Some(Selection::collapsed(3)));
        s.place_cursor(100);
        assert_eq!(s.cursor_offset(), Some(5));
    }

    #[test]
    fn test_place_cursor_in_empty_document() {
        let mut s = EditorSession::default();
        assert_eq!(s.cursor_offset(), None);
        s.place_cursor(4);
        assert_eq!(s.cursor_offset(), Some(0));
        assert!(s.document().has_leaves());
        assert_eq!(s.export_text(), "");
    }

    #[test]
    fn test_ensure_cursor_goes_to_end() {
        let mut s = session("ab\ncd");
        assert_eq!(s.ensure_cursor(), 5);
        s.place_cursor(1);
        assert_eq!(s.ensure_cursor(), 1);
    }

    #[test]
    fn test_insert_text_replaces_selection() {
        let mut s = session("hello world");
        s.select(11, 6);
        let range = s.insert_text("there");
        assert_eq!(range, 6..11);
        assert_eq!(s.export_text(), "hello there");
        assert_eq!(s.cursor_offset(), Some(11));
    }

    #[test]
    fn test_crlf_template_offsets_match_source() {
        let mut s = session("ab\r\ncd");
        s.place_cursor(4);
        let range = s.insert_text("X");
        assert_eq!(range, 4..5);
        assert_eq!(s.export_text(), "ab\r\nXcd");
        assert_eq!(s.cursor_offset(), Some(5));
        assert_eq!(
            s.document().last_edit().map(EditInfo::affected_range),
            Some(4..5)
        );
    }

    #[test]
    fn test_selection_follows_out_of_band_edits() {
        let mut s = session("abc");
        s.place_cursor(2);
        // A host wraps everything in a heading; the anchor path goes stale
        // and the cursor reads back clamped instead of failing.
        let children = std::mem::take(s.document_mut().children_mut());
        s.document_mut()
            .children_mut()
            .push(Segment::container(ContainerKind::Heading(2), children));
        assert_eq!(s.cursor_offset(), Some(3));
        assert_eq!(s.export_text(), "abc");
    }

    #[test]
    fn test_focus_rules() {
        let mut s = session("x");
        assert!(s.focus());
        s.blur();
        assert!(!s.is_focused());

        let mut ro = EditorSession::read_only(EditableDocument::new(), EditorConfig::default());
        assert!(!ro.focus());
    }
}

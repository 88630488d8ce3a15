//! The editable document: a tree of text runs, hard breaks and containers.
//!
//! Canonical text is the depth-first concatenation of text runs, with one
//! `'\n'` per hard break. Containers (headings, lists, quotes) contribute only
//! their descendants. Text runs are not expected to contain `'\n'`
//! themselves; imported and inserted text is split on `'\n'` alone into runs
//! and breaks, so a `'\r'` before a newline stays in the run and canonical
//! offsets match char offsets of the source text.
//!
//! Mutations address the tree by canonical offset and re-derive node
//! positions afterwards, so callers never hold on to node paths across an
//! edit.

use std::ops::{ControlFlow, Range};

use crate::offset_map::{Anchor, NodePath, anchor_of};
use crate::text::TextBuffer;
use crate::types::EditInfo;

/// Character used for a hard break in canonical text.
pub const BREAK_CHAR: char = '\n';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Paragraph,
    /// Heading level, 1 through 6.
    Heading(u8),
    Quote,
    OrderedList,
    UnorderedList,
    ListItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub kind: ContainerKind,
    pub children: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Break,
    Container(Container),
}

impl Segment {
    pub fn text(text: impl Into<String>) -> Self {
        Segment::Text(text.into())
    }

    pub fn container(kind: ContainerKind, children: Vec<Segment>) -> Self {
        Segment::Container(Container { kind, children })
    }

    /// Canonical length of this segment and its descendants.
    pub fn canonical_len(&self) -> usize {
        match self {
            Segment::Text(text) => text.chars().count(),
            Segment::Break => 1,
            Segment::Container(c) => c.children.iter().map(Segment::canonical_len).sum(),
        }
    }
}

/// A leaf as seen by a depth-first walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leaf<'a> {
    Text(&'a str),
    Break,
}

impl Leaf<'_> {
    pub fn canonical_len(&self) -> usize {
        match self {
            Leaf::Text(text) => text.chars().count(),
            Leaf::Break => 1,
        }
    }
}

/// Split plain text into runs separated by hard breaks.
pub fn segments_from_text(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for (i, line) in text.split(BREAK_CHAR).enumerate() {
        if i > 0 {
            segments.push(Segment::Break);
        }
        if !line.is_empty() {
            segments.push(Segment::text(line));
        }
    }
    segments
}

#[derive(Debug, Clone, Default)]
pub struct EditableDocument {
    children: Vec<Segment>,
    last_edit: Option<EditInfo>,
}

impl PartialEq for EditableDocument {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl EditableDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(children: Vec<Segment>) -> Self {
        Self {
            children,
            last_edit: None,
        }
    }

    /// Build a document from plain text, one run per line.
    pub fn from_text(text: &str) -> Self {
        Self::from_segments(segments_from_text(text))
    }

    pub fn children(&self) -> &[Segment] {
        &self.children
    }

    /// Direct access to the tree. Edits made here are not recorded as
    /// `last_edit`.
    pub fn children_mut(&mut self) -> &mut Vec<Segment> {
        &mut self.children
    }

    pub fn canonical_text(&self) -> String {
        let mut out = String::new();
        let _ = self.walk_leaves(|_, leaf| {
            match leaf {
                Leaf::Text(text) => out.push_str(text),
                Leaf::Break => out.push(BREAK_CHAR),
            }
            ControlFlow::Continue(())
        });
        out
    }

    pub fn canonical_len(&self) -> usize {
        self.children.iter().map(Segment::canonical_len).sum()
    }

    /// Whether the tree has any text run or break to anchor a cursor to.
    pub fn has_leaves(&self) -> bool {
        self.walk_leaves(|_, _| ControlFlow::Break(())).is_break()
    }

    /// Depth-first walk over text runs and breaks, with their node paths.
    pub fn walk_leaves<'a, F>(&'a self, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(&[usize], Leaf<'a>) -> ControlFlow<()>,
    {
        let mut path = NodePath::new();
        walk(&self.children, &mut path, &mut f)
    }

    pub fn node(&self, path: &[usize]) -> Option<&Segment> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get(*first)?;
        for index in rest {
            match node {
                Segment::Container(c) => node = c.children.get(*index)?,
                _ => return None,
            }
        }
        Some(node)
    }

    /// Children of the container at `path`; the root list for an empty path.
    fn children_at_mut(&mut self, path: &[usize]) -> Option<&mut Vec<Segment>> {
        let mut children = &mut self.children;
        for index in path {
            match children.get_mut(*index)? {
                Segment::Container(c) => children = &mut c.children,
                _ => return None,
            }
        }
        Some(children)
    }

    /// Give an empty document a text run so a cursor can live in it.
    /// Returns the anchor inside that run.
    pub fn ensure_anchorable(&mut self) -> Option<Anchor> {
        if self.has_leaves() {
            return None;
        }
        self.children.push(Segment::text(""));
        Some(Anchor::Text {
            path: vec![self.children.len() - 1],
            offset: 0,
        })
    }

    /// Insert segments at a canonical offset (clamped).
    pub fn insert_segments(&mut self, offset: usize, segments: Vec<Segment>) {
        if segments.is_empty() {
            return;
        }
        let anchor = anchor_of(self, offset);
        tracing::trace!(target: "stencil::document", offset, ?anchor, "insert segments");

        match anchor {
            Anchor::Text { path, offset } => {
                let Some((index, parent)) = path.split_last() else {
                    return;
                };
                let Some(siblings) = self.children_at_mut(parent) else {
                    return;
                };
                let Some(Segment::Text(run)) = siblings.get(*index) else {
                    return;
                };
                let split = byte_index(run, offset);
                let (left, right) = (run[..split].to_owned(), run[split..].to_owned());

                let mut replacement = Vec::with_capacity(segments.len() + 2);
                replacement.push(Segment::Text(left));
                replacement.extend(segments);
                replacement.push(Segment::Text(right));
                siblings.splice(*index..*index + 1, replacement);
            }
            Anchor::BeforeBreak { path } => {
                if let Some((index, parent)) = path.split_last() {
                    if let Some(siblings) = self.children_at_mut(parent) {
                        siblings.splice(*index..*index, segments);
                    }
                }
            }
            Anchor::AfterBreak { path } => {
                if let Some((index, parent)) = path.split_last() {
                    if let Some(siblings) = self.children_at_mut(parent) {
                        siblings.splice(*index + 1..*index + 1, segments);
                    }
                }
            }
            Anchor::End { path } => {
                if let Some(children) = self.children_at_mut(&path) {
                    children.extend(segments);
                }
            }
        }

        normalize(&mut self.children);
    }

    /// Remove a canonical range. Breaks inside the range disappear; containers
    /// stay even if they end up empty.
    pub fn delete_range(&mut self, range: Range<usize>) -> bool {
        if range.is_empty() {
            return false;
        }
        let mut cursor = 0;
        let mut removed_break = false;
        delete_in(&mut self.children, &mut cursor, &range, &mut removed_break);
        normalize(&mut self.children);
        removed_break
    }
}

fn walk<'a, F>(children: &'a [Segment], path: &mut NodePath, f: &mut F) -> ControlFlow<()>
where
    F: FnMut(&[usize], Leaf<'a>) -> ControlFlow<()>,
{
    for (i, child) in children.iter().enumerate() {
        path.push(i);
        let flow = match child {
            Segment::Text(text) => f(path, Leaf::Text(text)),
            Segment::Break => f(path, Leaf::Break),
            Segment::Container(c) => walk(&c.children, path, f),
        };
        path.pop();
        if flow.is_break() {
            return flow;
        }
    }
    ControlFlow::Continue(())
}

fn delete_in(
    children: &mut Vec<Segment>,
    cursor: &mut usize,
    range: &Range<usize>,
    removed_break: &mut bool,
) {
    let mut i = 0;
    while i < children.len() {
        match &mut children[i] {
            Segment::Text(text) => {
                let start = *cursor;
                let len = text.chars().count();
                let lo = range.start.max(start);
                let hi = range.end.min(start + len);
                if lo < hi {
                    let from = byte_index(text, lo - start);
                    let to = byte_index(text, hi - start);
                    text.replace_range(from..to, "");
                }
                *cursor = start + len;
            }
            Segment::Break => {
                let pos = *cursor;
                *cursor += 1;
                if range.contains(&pos) {
                    children.remove(i);
                    *removed_break = true;
                    continue;
                }
            }
            Segment::Container(c) => delete_in(&mut c.children, cursor, range, removed_break),
        }
        i += 1;
    }
}

/// Merge adjacent text runs and drop empty ones, at every level.
fn normalize(children: &mut Vec<Segment>) {
    let mut merged: Vec<Segment> = Vec::with_capacity(children.len());
    for mut child in children.drain(..) {
        if let Segment::Container(c) = &mut child {
            normalize(&mut c.children);
        }
        match (&mut child, merged.last_mut()) {
            (Segment::Text(text), _) if text.is_empty() => {}
            (Segment::Text(text), Some(Segment::Text(prev))) => prev.push_str(text),
            _ => merged.push(child),
        }
    }
    *children = merged;
}

/// Byte index of the `char_offset`-th char, clamped to the string end.
pub(crate) fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(byte, _)| byte)
}

impl TextBuffer for EditableDocument {
    fn len_chars(&self) -> usize {
        self.canonical_len()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        let offset = char_offset.min(self.canonical_len());
        self.insert_segments(offset, segments_from_text(text));
        self.last_edit = Some(EditInfo::insertion(offset, text, self.canonical_len()));
    }

    fn delete(&mut self, char_range: Range<usize>) {
        let len = self.canonical_len();
        let range = char_range.start.min(len)..char_range.end.min(len);
        let removed_break = self.delete_range(range.clone());
        self.last_edit = Some(EditInfo::deletion(
            range,
            removed_break,
            self.canonical_len(),
        ));
    }

    fn last_edit(&self) -> Option<&EditInfo> {
        self.last_edit.as_ref()
    }
}

//! Mapping between node anchors and canonical offsets.
//!
//! An [`Anchor`] is a concrete place in the document tree: a char offset
//! inside a text run, or a position right before or after a hard break.
//! A canonical offset is the number of canonical chars before the cursor.
//!
//! For any document `d` and offset `o`, `offset_of(d, &anchor_of(d, o))`
//! equals `o` clamped to `d.canonical_len()`.

use std::ops::ControlFlow;

use crate::document::{EditableDocument, Leaf, Segment};

/// Index path from the root's children down to a node.
pub type NodePath = Vec<usize>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// Char offset within the text run at `path`.
    Text { path: NodePath, offset: usize },
    /// Immediately before the hard break at `path`.
    BeforeBreak { path: NodePath },
    /// Immediately after the hard break at `path`.
    AfterBreak { path: NodePath },
    /// After the last descendant of the container at `path` (root if empty).
    End { path: NodePath },
}

impl Anchor {
    pub fn root_end() -> Self {
        Anchor::End { path: Vec::new() }
    }

    pub fn path(&self) -> &[usize] {
        match self {
            Anchor::Text { path, .. }
            | Anchor::BeforeBreak { path }
            | Anchor::AfterBreak { path }
            | Anchor::End { path } => path,
        }
    }
}

/// Canonical offset of an anchor.
///
/// Anchors that do not resolve (stale path, path pointing at the wrong kind
/// of node) fall back to the end of the document.
pub fn offset_of(doc: &EditableDocument, anchor: &Anchor) -> usize {
    let resolved = match anchor {
        Anchor::End { path } => end_offset(doc, path),
        _ => leaf_offset(doc, anchor),
    };

    resolved.unwrap_or_else(|| {
        let len = doc.canonical_len();
        tracing::warn!(
            target: "stencil::offset_map",
            ?anchor,
            fallback = len,
            "anchor did not resolve, clamping to document end"
        );
        len
    })
}

fn leaf_offset(doc: &EditableDocument, anchor: &Anchor) -> Option<usize> {
    let target = anchor.path();
    let mut cum = 0;
    let mut found = None;

    let _ = doc.walk_leaves(|path, leaf| {
        if path == target {
            found = match (anchor, leaf) {
                (Anchor::Text { offset, .. }, Leaf::Text(text)) => {
                    Some(cum + (*offset).min(text.chars().count()))
                }
                (Anchor::BeforeBreak { .. }, Leaf::Break) => Some(cum),
                (Anchor::AfterBreak { .. }, Leaf::Break) => Some(cum + 1),
                _ => None,
            };
            return ControlFlow::Break(());
        }
        cum += leaf.canonical_len();
        ControlFlow::Continue(())
    });

    found
}

fn end_offset(doc: &EditableDocument, target: &[usize]) -> Option<usize> {
    if target.is_empty() {
        return Some(doc.canonical_len());
    }
    let Some(Segment::Container(_)) = doc.node(target) else {
        return None;
    };

    // Everything before the container plus everything inside it.
    let mut cum = 0;
    let _ = doc.walk_leaves(|path, leaf| {
        if path < target || path.starts_with(target) {
            cum += leaf.canonical_len();
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    });
    Some(cum)
}

/// Anchor for a canonical offset, clamped to the document length.
///
/// Prefers the first text run whose span covers the offset. An offset that
/// lands on a break boundary with no run covering it anchors before that
/// break. Past the last leaf it anchors at the end of the root.
pub fn anchor_of(doc: &EditableDocument, offset: usize) -> Anchor {
    let offset = offset.min(doc.canonical_len());
    let mut cum = 0;
    let mut found = None;

    let _ = doc.walk_leaves(|path, leaf| {
        match leaf {
            Leaf::Text(text) => {
                let len = text.chars().count();
                if cum + len >= offset {
                    found = Some(Anchor::Text {
                        path: path.to_vec(),
                        offset: offset - cum,
                    });
                    return ControlFlow::Break(());
                }
                cum += len;
            }
            Leaf::Break => {
                if cum >= offset {
                    found = Some(Anchor::BeforeBreak {
                        path: path.to_vec(),
                    });
                    return ControlFlow::Break(());
                }
                cum += 1;
            }
        }
        ControlFlow::Continue(())
    });

    let anchor = found.unwrap_or_else(Anchor::root_end);
    tracing::trace!(target: "stencil::offset_map", offset, ?anchor, "anchor_of");
    anchor
}

//! stencil-editor-core: template editing logic without UI dependencies.
//!
//! This crate provides:
//! - `TextBuffer` trait for text storage abstraction
//! - `EditorRope` - ropey-backed line index for exported text
//! - `EditableDocument` - node tree of text runs, breaks and containers
//! - `offset_map` - anchor/offset conversion over the tree
//! - `TemplateInsertionEngine` - placeholder and loop block insertion
//! - `apply_format` - formatting commands forwarded to a `FormattingHost`

pub mod document;
pub mod format;
pub mod insert;
pub mod loops;
pub mod offset_map;
pub mod platform;
pub mod session;
pub mod text;
pub mod types;

pub use document::{Container, ContainerKind, EditableDocument, Leaf, Segment};
pub use format::{FormatCommand, LIST_ITEM_PLACEHOLDER, apply_format};
pub use insert::{InsertOutcome, TemplateInsertionEngine};
pub use loops::{LoopBlock, find_loop_blocks, find_placeholder};
pub use offset_map::{Anchor, NodePath, anchor_of, offset_of};
pub use platform::{FormattingHost, PlatformError};
pub use session::{AnchorSelection, EditorSession};
pub use smol_str::SmolStr;
pub use text::{EditorRope, TextBuffer};
pub use types::{EditInfo, Selection};

//! Placeholder insertion, aware of loop blocks.
//!
//! A top-level attribute becomes `{{ name }}` at the cursor. A nested
//! attribute goes into the loop block for its parent that the cursor is in,
//! or, if the cursor is in none, into a newly synthesized block. Inserting an
//! attribute that the enclosing block already has only moves the cursor.

use std::ops::Range;

use smol_str::SmolStr;
use stencil_common::{EditorConfig, InsertTarget};

use crate::loops::{
    find_loop_blocks, find_placeholder, loop_lines, nested_placeholder, placeholder,
};
use crate::session::EditorSession;

/// What an insertion did. Ranges and cursors are canonical offsets after
/// the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// `{{ name }}` inserted at the cursor.
    Placeholder { range: Range<usize> },
    /// `{{ parent.name }}` inserted inside an existing loop block.
    InsideLoop { range: Range<usize> },
    /// The block already had the placeholder; only the cursor moved.
    Relocated { cursor: usize },
    /// A new loop block was inserted. `cursor` is the end of its placeholder
    /// line.
    NewLoop { range: Range<usize>, cursor: usize },
    /// The session could not take focus.
    Skipped,
}

impl InsertOutcome {
    /// Whether the document text changed.
    pub fn mutated(&self) -> bool {
        !matches!(self, InsertOutcome::Relocated { .. } | InsertOutcome::Skipped)
    }
}

#[derive(Debug, Clone)]
pub struct TemplateInsertionEngine {
    tolerance: usize,
    indent: SmolStr,
}

impl Default for TemplateInsertionEngine {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl TemplateInsertionEngine {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            tolerance: config.loop_tolerance,
            indent: config.loop_indent.clone(),
        }
    }

    pub fn for_session(session: &EditorSession) -> Self {
        Self::new(session.config())
    }

    /// Insert a resolved catalog target.
    pub fn insert_target(
        &self,
        session: &mut EditorSession,
        target: &InsertTarget<'_>,
    ) -> InsertOutcome {
        self.insert(
            session,
            &target.attribute.name,
            target.is_nested(),
            target.parent_name(),
        )
    }

    /// Insert `attribute`, nested under `parent` when `nested` is set.
    ///
    /// A nested request without a parent is treated as a top-level one.
    pub fn insert(
        &self,
        session: &mut EditorSession,
        attribute: &str,
        nested: bool,
        parent: Option<&str>,
    ) -> InsertOutcome {
        if !session.focus() {
            tracing::debug!(
                target: "stencil::insert",
                attribute,
                "session not focusable, skipping"
            );
            return InsertOutcome::Skipped;
        }

        let outcome = match (nested, parent) {
            (true, Some(parent)) => self.insert_nested(session, parent, attribute),
            (true, None) => {
                tracing::warn!(
                    target: "stencil::insert",
                    attribute,
                    "nested insertion without a parent, inserting top-level placeholder"
                );
                self.insert_plain(session, attribute)
            }
            (false, _) => self.insert_plain(session, attribute),
        };

        tracing::debug!(target: "stencil::insert", attribute, ?parent, ?outcome, "inserted");
        outcome
    }

    fn insert_plain(&self, session: &mut EditorSession, attribute: &str) -> InsertOutcome {
        let range = session.insert_text(&placeholder(attribute));
        InsertOutcome::Placeholder { range }
    }

    fn insert_nested(
        &self,
        session: &mut EditorSession,
        parent: &str,
        attribute: &str,
    ) -> InsertOutcome {
        // Read the cursor fresh; earlier edits may have moved it.
        let cursor = session.ensure_cursor();
        let text = session.export_text();
        let blocks = find_loop_blocks(&text, parent);

        let Some(block) = blocks.iter().find(|b| b.contains(cursor, self.tolerance)) else {
            return self.insert_loop(session, parent, attribute);
        };

        tracing::trace!(
            target: "stencil::insert",
            parent,
            cursor,
            body = ?block.body_range(),
            "cursor inside loop block"
        );

        if let Some(existing) = find_placeholder(&block.body, parent, attribute) {
            let cursor = block.body_start + existing.end;
            session.place_cursor(cursor);
            return InsertOutcome::Relocated { cursor };
        }

        let range = session.insert_text(&nested_placeholder(parent, attribute));
        InsertOutcome::InsideLoop { range }
    }

    fn insert_loop(
        &self,
        session: &mut EditorSession,
        parent: &str,
        attribute: &str,
    ) -> InsertOutcome {
        let [open, body, close] = loop_lines(parent, attribute, &self.indent);
        let block = format!("{open}\n{body}\n{close}");
        let range = session.insert_text(&block);

        let cursor = range.start + open.chars().count() + 1 + body.chars().count();
        session.place_cursor(cursor);
        InsertOutcome::NewLoop { range, cursor }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::EditableDocument;

    fn session(text: &str) -> EditorSession {
        EditorSession::with_document(EditableDocument::from_text(text), EditorConfig::default())
    }

    #[test]
    fn test_plain_into_empty_document() {
        let mut s = EditorSession::default();
        let engine = TemplateInsertionEngine::for_session(&s);
        let outcome = engine.insert(&mut s, "Age", false, None);
        assert_eq!(outcome, InsertOutcome::Placeholder { range: 0..9 });
        assert_eq!(s.export_text(), "{{ Age }}");
        assert_eq!(s.cursor_offset(), Some(9));
    }

    #[test]
    fn test_plain_replaces_selection() {
        let mut s = session("Name: XXX!");
        s.select(6, 9);
        TemplateInsertionEngine::default().insert(&mut s, "Name", false, None);
        assert_eq!(s.export_text(), "Name: {{ Name }}!");
        assert_eq!(s.cursor_offset(), Some(16));
    }

    #[test]
    fn test_nested_without_parent_is_plain() {
        let mut s = session("");
        let outcome = TemplateInsertionEngine::default().insert(&mut s, "Name", true, None);
        assert!(matches!(outcome, InsertOutcome::Placeholder { .. }));
        assert_eq!(s.export_text(), "{{ Name }}");
    }

    #[test]
    fn test_new_loop_cursor_after_middle_line() {
        let mut s = session("Hi ");
        s.place_cursor(3);
        let outcome =
            TemplateInsertionEngine::default().insert(&mut s, "Name", true, Some("Child"));
        // 3 + "{% for Child in Child %}" (24) + break + "  {{ Child.Name }}" (18)
        assert_eq!(
            outcome,
            InsertOutcome::NewLoop {
                range: 3..59,
                cursor: 46
            }
        );
        assert_eq!(s.cursor_offset(), Some(46));
        insta::assert_snapshot!(s.export_text(), @r"
        Hi {% for Child in Child %}
          {{ Child.Name }}
        {% endfor %}
        ");
    }

    #[test]
    fn test_inside_loop_adds_placeholder() {
        let mut s = session("{% for Child in Child %}\n  {{ Child.Name }}\n{% endfor %}");
        // End of the "{{ Child.Name }}" line.
        s.place_cursor(43);
        s.insert_text("\n  ");
        let outcome = TemplateInsertionEngine::default().insert(&mut s, "Age", true, Some("Child"));
        assert_eq!(outcome, InsertOutcome::InsideLoop { range: 46..61 });
        assert_eq!(
            s.export_text(),
            "{% for Child in Child %}\n  {{ Child.Name }}\n  {{ Child.Age }}\n{% endfor %}"
        );
    }

    #[test]
    fn test_tolerance_window() {
        let text = "{% for P in P %}{{ P.a }}{% endfor %}";
        let engine = TemplateInsertionEngine::default();

        // Body starts at 16. Ten chars before still counts as inside.
        let mut s = session(text);
        s.place_cursor(6);
        assert_eq!(
            engine.insert(&mut s, "a", true, Some("P")),
            InsertOutcome::Relocated { cursor: 25 }
        );

        let mut s = session(text);
        s.place_cursor(5);
        assert!(matches!(
            engine.insert(&mut s, "a", true, Some("P")),
            InsertOutcome::NewLoop { .. }
        ));
    }

    #[test]
    fn test_custom_tolerance_and_indent() {
        let config = EditorConfig {
            loop_tolerance: 0,
            loop_indent: SmolStr::new_static("\t"),
        };
        let mut s = EditorSession::with_document(
            EditableDocument::from_text("{% for P in P %}x{% endfor %}"),
            config,
        );
        s.place_cursor(0);
        let engine = TemplateInsertionEngine::for_session(&s);
        let outcome = engine.insert(&mut s, "a", true, Some("P"));
        assert_eq!(outcome, InsertOutcome::NewLoop { range: 0..40, cursor: 27 });
        assert!(s.export_text().starts_with("{% for P in P %}\n\t{{ P.a }}\n{% endfor %}"));
    }

    #[test]
    fn test_unfocusable_session_skips() {
        let mut s =
            EditorSession::read_only(EditableDocument::from_text("x"), EditorConfig::default());
        let outcome = TemplateInsertionEngine::default().insert(&mut s, "Age", false, None);
        assert_eq!(outcome, InsertOutcome::Skipped);
        assert!(!outcome.mutated());
        assert_eq!(s.export_text(), "x");
    }
}

//! Formatting commands and the facade that forwards them to the host.

use std::fmt;

use crate::platform::FormattingHost;
use crate::session::EditorSession;

/// Placeholder text a list command inserts when there is nothing selected.
pub const LIST_ITEM_PLACEHOLDER: &str = "List item";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    /// Heading block, level 1 through 6.
    Heading(u8),
    Paragraph,
    Quote,
    OrderedList,
    UnorderedList,
    Undo,
    Redo,
}

impl FormatCommand {
    /// Host command name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Heading(_) | Self::Paragraph | Self::Quote => "formatBlock",
            Self::OrderedList => "insertOrderedList",
            Self::UnorderedList => "insertUnorderedList",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }

    /// Host command argument, for block formats.
    pub fn value(&self) -> Option<String> {
        match self {
            Self::Heading(level) => Some(format!("h{level}")),
            Self::Paragraph => Some("p".to_owned()),
            Self::Quote => Some("blockquote".to_owned()),
            _ => None,
        }
    }

    /// Parse a host command name and optional argument.
    pub fn parse(name: &str, value: Option<&str>) -> Option<Self> {
        let cmd = match (name, value) {
            ("bold", _) => Self::Bold,
            ("italic", _) => Self::Italic,
            ("insertOrderedList", _) => Self::OrderedList,
            ("insertUnorderedList", _) => Self::UnorderedList,
            ("undo", _) => Self::Undo,
            ("redo", _) => Self::Redo,
            ("formatBlock", Some(block)) => {
                let block = block.trim_matches(['<', '>']).to_ascii_lowercase();
                match block.as_str() {
                    "p" => Self::Paragraph,
                    "blockquote" => Self::Quote,
                    h => {
                        let level = h.strip_prefix('h')?.parse::<u8>().ok()?;
                        if !(1..=6).contains(&level) {
                            return None;
                        }
                        Self::Heading(level)
                    }
                }
            }
            _ => return None,
        };
        Some(cmd)
    }

    /// Undo and redo act on history, not on the selection.
    pub fn is_history(&self) -> bool {
        matches!(self, Self::Undo | Self::Redo)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::OrderedList | Self::UnorderedList)
    }
}

impl fmt::Display for FormatCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(value) => write!(f, "{}({value})", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

/// Apply a formatting command through the host.
///
/// Focuses the session first. Commands other than undo/redo need a cursor,
/// so one is placed at the end of the document if there is none. A list
/// command over a collapsed selection first inserts [`LIST_ITEM_PLACEHOLDER`]
/// and selects it so the new item has content.
///
/// Host failures are logged and swallowed; the document is left as the host
/// left it. Returns whether the host reported success.
pub fn apply_format(
    session: &mut EditorSession,
    host: &mut impl FormattingHost,
    command: FormatCommand,
) -> bool {
    if !session.focus() {
        tracing::debug!(target: "stencil::format", %command, "session not focusable, skipping");
        return false;
    }

    if !command.is_history() {
        session.ensure_cursor();
        let collapsed = session.selection().is_some_and(|sel| sel.is_collapsed());
        if command.is_list() && collapsed {
            let inserted = session.insert_text(LIST_ITEM_PLACEHOLDER);
            session.select(inserted.start, inserted.end);
        }
    }

    let result = host.apply(session, &command);
    session.focus();

    match result {
        Ok(()) => {
            tracing::trace!(target: "stencil::format", %command, "applied");
            true
        }
        Err(e) => {
            tracing::error!(
                target: "stencil::format",
                %command,
                error = %e,
                "format command failed"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::EditableDocument;
    use crate::platform::PlatformError;
    use crate::types::Selection;
    use stencil_common::EditorConfig;

    #[derive(Default)]
    struct RecordingHost {
        applied: Vec<(FormatCommand, Option<Selection>)>,
    }

    impl FormattingHost for RecordingHost {
        fn apply(
            &mut self,
            session: &mut EditorSession,
            command: &FormatCommand,
        ) -> Result<(), PlatformError> {
            self.applied.push((*command, session.selection()));
            Ok(())
        }
    }

    fn session(text: &str) -> EditorSession {
        EditorSession::with_document(EditableDocument::from_text(text), EditorConfig::default())
    }

    #[test]
    fn test_command_names() {
        assert_eq!(FormatCommand::Heading(2).name(), "formatBlock");
        assert_eq!(FormatCommand::Heading(2).value().as_deref(), Some("h2"));
        assert_eq!(FormatCommand::Quote.to_string(), "formatBlock(blockquote)");
        assert_eq!(FormatCommand::Bold.to_string(), "bold");
    }

    #[test]
    fn test_parse() {
        assert_eq!(FormatCommand::parse("bold", None), Some(FormatCommand::Bold));
        assert_eq!(
            FormatCommand::parse("formatBlock", Some("<H3>")),
            Some(FormatCommand::Heading(3))
        );
        assert_eq!(
            FormatCommand::parse("formatBlock", Some("blockquote")),
            Some(FormatCommand::Quote)
        );
        assert_eq!(FormatCommand::parse("formatBlock", Some("h7")), None);
        assert_eq!(FormatCommand::parse("formatBlock", None), None);
        assert_eq!(FormatCommand::parse("strikeThrough", None), None);
    }

    #[test]
    fn test_places_cursor_at_end_when_missing() {
        let mut s = session("abc");
        let mut host = RecordingHost::default();
        assert!(apply_format(&mut s, &mut host, FormatCommand::Bold));
        assert_eq!(host.applied, vec![(FormatCommand::Bold, Some(Selection::collapsed(3)))]);
        assert!(s.is_focused());
    }

    #[test]
    fn test_history_commands_skip_cursor() {
        let mut s = session("abc");
        let mut host = RecordingHost::default();
        apply_format(&mut s, &mut host, FormatCommand::Undo);
        assert_eq!(host.applied, vec![(FormatCommand::Undo, None)]);
    }

    #[test]
    fn test_list_inserts_placeholder() {
        let mut s = session("Items: ");
        s.place_cursor(7);
        let mut host = RecordingHost::default();
        apply_format(&mut s, &mut host, FormatCommand::UnorderedList);
        assert_eq!(s.export_text(), "Items: List item");
        assert_eq!(host.applied[0].1, Some(Selection::new(7, 16)));
    }

    #[test]
    fn test_list_keeps_existing_selection() {
        let mut s = session("one");
        s.select(0, 3);
        let mut host = RecordingHost::default();
        apply_format(&mut s, &mut host, FormatCommand::OrderedList);
        assert_eq!(s.export_text(), "one");
    }

    #[test]
    fn test_host_failure_is_swallowed() {
        let mut s = session("abc");
        let mut failing = |_: &mut EditorSession, _: &FormatCommand| -> Result<(), PlatformError> {
            Err("not supported".into())
        };
        assert!(!apply_format(&mut s, &mut failing, FormatCommand::Italic));
        assert_eq!(s.export_text(), "abc");
    }

    #[test]
    fn test_unfocusable_session() {
        let mut s =
            EditorSession::read_only(EditableDocument::from_text("abc"), EditorConfig::default());
        let mut host = RecordingHost::default();
        assert!(!apply_format(&mut s, &mut host, FormatCommand::Bold));
        assert!(host.applied.is_empty());
    }
}

//! Host capability traits.
//!
//! The editor does not implement rich-text formatting itself. A host (a
//! browser bridge, a native text view) applies formatting commands to the
//! session's document and reports failure through [`PlatformError`].

use crate::format::FormatCommand;
use crate::session::EditorSession;

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Native formatting commands.
///
/// Implementations may restructure the document freely (wrap runs in
/// headings, split list items, replay history). The session re-reads its
/// cursor from anchors afterwards, so no offset bookkeeping is required.
pub trait FormattingHost {
    fn apply(
        &mut self,
        session: &mut EditorSession,
        command: &FormatCommand,
    ) -> Result<(), PlatformError>;
}

impl<F> FormattingHost for F
where
    F: FnMut(&mut EditorSession, &FormatCommand) -> Result<(), PlatformError>,
{
    fn apply(
        &mut self,
        session: &mut EditorSession,
        command: &FormatCommand,
    ) -> Result<(), PlatformError> {
        self(session, command)
    }
}

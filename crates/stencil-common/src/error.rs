//! Error types for stencil.
//!
//! Everything here describes a rejected input: a package that does not parse,
//! has nothing to template, or nests deeper than allowed. None of these are
//! fatal; callers report them and keep their previous state.

use miette::{Diagnostic, NamedSource, SourceOffset, SourceSpan};
use smol_str::SmolStr;

/// Main error type for stencil operations.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum StencilError {
    /// Package or catalog JSON could not be parsed
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    /// Package has no capture-base attributes
    #[error("no attributes found in package")]
    #[diagnostic(
        code(stencil::no_attributes),
        help("the package needs oca_bundle.bundle.capture_base.attributes")
    )]
    NoAttributes,

    /// Schema nests deeper than the configured ceiling
    #[error(
        "Schema nesting level ({actual}) exceeds maximum allowed level ({max}). \
         Each Reference attribute creates a child schema level."
    )]
    #[diagnostic(code(stencil::depth_exceeded))]
    DepthExceeded { actual: usize, max: usize },

    /// Attribute catalog violates its shape contract
    #[error(transparent)]
    #[diagnostic(code(stencil::catalog))]
    Catalog(#[from] CatalogError),

    /// Configuration could not be loaded or saved
    #[error("configuration error: {0}")]
    #[diagnostic(code(stencil::config))]
    Config(String),

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Violations of the attribute catalog contract.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("attribute `{name}` has nested attributes but is neither an array nor a reference")]
    NestedOnScalar { name: SmolStr },

    #[error("attribute `{name}` appears more than once in {scope}")]
    DuplicateName { scope: SmolStr, name: SmolStr },

    #[error("unknown attribute `{path}`")]
    UnknownAttribute { path: SmolStr },

    #[error("attribute `{name}` is not repeatable and cannot hold nested attributes")]
    NotRepeatable { name: SmolStr },
}

/// JSON parse error with source location information.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[error("parse error: {source}")]
#[diagnostic(code(stencil::parse))]
pub struct ParseError {
    source: serde_json::Error,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    err_location: SourceSpan,
    #[help]
    advice: Option<String>,
}

impl ParseError {
    /// Wrap a serde_json error, pointing the label at its line and column
    /// within `text`.
    pub fn new(name: impl AsRef<str>, text: &str, source: serde_json::Error) -> Self {
        let location = match (source.line(), source.column()) {
            (0, _) => SourceSpan::new(SourceOffset::from(0), 0),
            (line, column) => {
                SourceSpan::new(SourceOffset::from_location(text, line, column), 0)
            }
        };
        let advice = source
            .is_eof()
            .then(|| "the file ends early; is it truncated?".to_owned());
        Self {
            source,
            src: NamedSource::new(name, text.to_owned()),
            err_location: location,
            advice,
        }
    }

    pub fn line_col(&self) -> (usize, usize) {
        (self.source.line(), self.source.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_exceeded_message() {
        let err = StencilError::DepthExceeded { actual: 3, max: 2 };
        insta::assert_snapshot!(
            err.to_string(),
            @"Schema nesting level (3) exceeds maximum allowed level (2). Each Reference attribute creates a child schema level."
        );
    }

    #[test]
    fn test_parse_error_location() {
        let text = "{\n  \"d\": \n}";
        let source = serde_json::from_str::<serde_json::Value>(text).unwrap_err();
        let err = ParseError::new("package.json", text, source);
        assert_eq!(err.line_col().0, 3);
    }
}

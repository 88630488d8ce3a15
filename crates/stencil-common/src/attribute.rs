//! Attribute type strings as they appear in a capture base.
//!
//! Capture bases spell types as plain names (`Text`), repeated names
//! (`Array[Text]`) or references to another schema (`Reference`,
//! `refs:<digest>`, `Array[refs:<digest>]`). [`AttributeType`] parses all of
//! them into one shape.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

const ARRAY_PREFIX: &str = "Array[";
const REFS_PREFIX: &str = "refs:";

/// Scalar kind of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    Text,
    Numeric,
    DateTime,
    Boolean,
    Binary,
    Date,
    Reference,
    /// A type name this crate does not know. Kept verbatim.
    #[serde(untagged)]
    Other(SmolStr),
}

impl AttributeKind {
    pub fn as_str(&self) -> &str {
        match self {
            AttributeKind::Text => "Text",
            AttributeKind::Numeric => "Numeric",
            AttributeKind::DateTime => "DateTime",
            AttributeKind::Boolean => "Boolean",
            AttributeKind::Binary => "Binary",
            AttributeKind::Date => "Date",
            AttributeKind::Reference => "Reference",
            AttributeKind::Other(name) => name.as_str(),
        }
    }

    fn from_name(name: &str) -> Self {
        match name {
            "Text" => AttributeKind::Text,
            "Numeric" => AttributeKind::Numeric,
            "DateTime" => AttributeKind::DateTime,
            "Boolean" => AttributeKind::Boolean,
            "Binary" => AttributeKind::Binary,
            "Date" => AttributeKind::Date,
            "Reference" => AttributeKind::Reference,
            other => AttributeKind::Other(SmolStr::new(other)),
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed capture-base type string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeType {
    pub kind: AttributeKind,
    /// `Array[...]` wrapper present.
    pub is_array: bool,
    /// Digest of the referenced schema, for `refs:<digest>` types.
    pub target: Option<SmolStr>,
}

impl AttributeType {
    pub fn scalar(kind: AttributeKind) -> Self {
        Self {
            kind,
            is_array: false,
            target: None,
        }
    }

    pub fn is_reference(&self) -> bool {
        self.kind == AttributeKind::Reference
    }

    /// Whether templates iterate over this attribute with a loop block.
    pub fn is_repeatable(&self) -> bool {
        self.is_array || self.is_reference()
    }

    /// Parse a type string. Never fails: unknown names become
    /// [`AttributeKind::Other`].
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (inner, is_array) = match raw
            .strip_prefix(ARRAY_PREFIX)
            .and_then(|rest| rest.strip_suffix(']'))
        {
            Some(inner) => (inner.trim(), true),
            None => (raw, false),
        };

        match inner.strip_prefix(REFS_PREFIX) {
            Some(digest) => Self {
                kind: AttributeKind::Reference,
                is_array,
                target: (!digest.is_empty()).then(|| SmolStr::new(digest)),
            },
            None => Self {
                kind: AttributeKind::from_name(inner),
                is_array,
                target: None,
            },
        }
    }
}

impl FromStr for AttributeType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = match &self.target {
            Some(digest) => format!("{REFS_PREFIX}{digest}"),
            None => self.kind.to_string(),
        };
        if self.is_array {
            write!(f, "{ARRAY_PREFIX}{inner}]")
        } else {
            f.write_str(&inner)
        }
    }
}

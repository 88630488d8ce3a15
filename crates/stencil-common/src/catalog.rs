//! The attribute catalog the template editor inserts from.
//!
//! A catalog is built elsewhere from an uploaded package; this module only
//! holds its shape and enforces the two invariants templates rely on: nested
//! attributes hang off repeatable parents only, and names are unique within
//! their scope.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};

use crate::attribute::AttributeKind;
use crate::error::CatalogError;

/// One attribute a template can reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDescriptor {
    pub name: SmolStr,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub kind: AttributeKind,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub is_reference: bool,
    /// Attributes addressed as `name.child` inside a loop over `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<Vec<AttributeDescriptor>>,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<SmolStr>, kind: AttributeKind) -> Self {
        let name = name.into();
        Self {
            label: name.to_string(),
            description: format!("Attribute: {name}"),
            is_reference: kind == AttributeKind::Reference,
            name,
            kind,
            is_array: false,
            nested: None,
        }
    }

    pub fn with_array(mut self, is_array: bool) -> Self {
        self.is_array = is_array;
        self
    }

    pub fn with_nested(mut self, nested: Vec<AttributeDescriptor>) -> Self {
        self.nested = Some(nested);
        self
    }

    /// Whether templates iterate over this attribute.
    pub fn is_repeatable(&self) -> bool {
        self.is_array || self.is_reference
    }

    pub fn nested(&self) -> &[AttributeDescriptor] {
        self.nested.as_deref().unwrap_or_default()
    }

    /// The placeholder a template uses for this attribute.
    pub fn template_usage(&self, parent: Option<&str>) -> String {
        match parent {
            Some(parent) => format!("{{{{ {parent}.{} }}}}", self.name),
            None => format!("{{{{ {} }}}}", self.name),
        }
    }

    /// Short human-facing type name.
    pub fn display_type(&self) -> &str {
        if self.is_repeatable() {
            return "Array/List";
        }
        match &self.kind {
            AttributeKind::Numeric => "Number",
            AttributeKind::DateTime | AttributeKind::Date => "DateTime",
            other => other.as_str(),
        }
    }

    fn check(&self, scope: &str) -> Result<(), CatalogError> {
        let Some(nested) = &self.nested else {
            return Ok(());
        };
        if !self.is_repeatable() {
            return Err(CatalogError::NestedOnScalar {
                name: self.name.clone(),
            });
        }
        let scope = format_smolstr!("{scope}.{}", self.name);
        check_scope(&scope, nested)
    }
}

fn check_scope(scope: &str, descriptors: &[AttributeDescriptor]) -> Result<(), CatalogError> {
    let mut seen = HashSet::with_capacity(descriptors.len());
    for descriptor in descriptors {
        if !seen.insert(descriptor.name.as_str()) {
            return Err(CatalogError::DuplicateName {
                scope: SmolStr::new(scope),
                name: descriptor.name.clone(),
            });
        }
        descriptor.check(scope)?;
    }
    Ok(())
}

/// A resolved insertion request: an attribute and, for nested attributes,
/// the repeatable parent it lives under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertTarget<'a> {
    pub attribute: &'a AttributeDescriptor,
    pub parent: Option<&'a AttributeDescriptor>,
}

impl InsertTarget<'_> {
    pub fn is_nested(&self) -> bool {
        self.parent.is_some()
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.parent.map(|p| p.name.as_str())
    }
}

/// Ordered, validated attribute catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AttributeCatalog {
    descriptors: Vec<AttributeDescriptor>,
}

impl AttributeCatalog {
    pub fn new(descriptors: Vec<AttributeDescriptor>) -> Result<Self, CatalogError> {
        check_scope("catalog", &descriptors)?;
        Ok(Self { descriptors })
    }

    pub fn from_json(text: &str) -> Result<Self, crate::StencilError> {
        let descriptors: Vec<AttributeDescriptor> = serde_json::from_str(text)
            .map_err(|e| crate::error::ParseError::new("catalog.json", text, e))?;
        Ok(Self::new(descriptors)?)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.descriptors.iter()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Resolve `name` or `parent.child` against the catalog.
    ///
    /// Only the first dot splits; attribute names themselves never contain
    /// one at the top level.
    pub fn resolve(&self, path: &str) -> Result<InsertTarget<'_>, CatalogError> {
        let unknown = || CatalogError::UnknownAttribute {
            path: SmolStr::new(path),
        };

        match path.split_once('.') {
            None => {
                let attribute = self.get(path).ok_or_else(unknown)?;
                Ok(InsertTarget {
                    attribute,
                    parent: None,
                })
            }
            Some((parent_name, child)) => {
                let parent = self.get(parent_name).ok_or_else(unknown)?;
                if !parent.is_repeatable() {
                    return Err(CatalogError::NotRepeatable {
                        name: parent.name.clone(),
                    });
                }
                let attribute = parent
                    .nested()
                    .iter()
                    .find(|d| d.name == child)
                    .ok_or_else(unknown)?;
                Ok(InsertTarget {
                    attribute,
                    parent: Some(parent),
                })
            }
        }
    }
}

impl<'a> IntoIterator for &'a AttributeCatalog {
    type Item = &'a AttributeDescriptor;
    type IntoIter = std::slice::Iter<'a, AttributeDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

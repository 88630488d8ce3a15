//! Accepting uploaded packages.
//!
//! An upload is accepted only if it parses, has at least one capture-base
//! attribute, and does not nest deeper than the configured ceiling. A
//! rejected upload leaves the previously accepted package in place.

use crate::depth::SchemaGraph;
use crate::error::StencilError;
use crate::package::OcaPackage;

/// A package that passed the gate.
#[derive(Debug, Clone)]
pub struct AcceptedPackage {
    pub name: String,
    pub package: OcaPackage,
    pub level: usize,
}

/// Check a package against `max_level` without storing it.
pub fn accept(name: &str, text: &str, max_level: usize) -> Result<AcceptedPackage, StencilError> {
    let package = OcaPackage::from_json(name, text)?;
    if package.attribute_count() == 0 {
        return Err(StencilError::NoAttributes);
    }

    let level = SchemaGraph::from_package(&package)
        .validate(max_level)
        .into_result(max_level)?;

    tracing::info!(package = name, level, max_level, "package accepted");
    Ok(AcceptedPackage {
        name: name.to_owned(),
        package,
        level,
    })
}

/// Holds the current package. Uploads replace it wholesale on success only.
#[derive(Debug, Default)]
pub struct PackageSlot {
    max_level: usize,
    current: Option<AcceptedPackage>,
}

impl PackageSlot {
    pub fn new(max_level: usize) -> Self {
        Self {
            max_level,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&AcceptedPackage> {
        self.current.as_ref()
    }

    pub fn upload(&mut self, name: &str, text: &str) -> Result<&AcceptedPackage, StencilError> {
        match accept(name, text, self.max_level) {
            Ok(accepted) => Ok(self.current.insert(accepted)),
            Err(err) => {
                tracing::warn!(package = name, error = %err, "package rejected");
                Err(err)
            }
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

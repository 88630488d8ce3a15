//! Serde model of an uploaded OCA package.
//!
//! Only the parts stencil reads are typed: the capture base (digest and
//! attribute types) and the dependency list. Overlays and extensions are kept
//! as raw JSON for whoever builds the attribute catalog.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::attribute::AttributeType;
use crate::error::{ParseError, StencilError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcaPackage {
    #[serde(default)]
    pub d: Option<SmolStr>,
    #[serde(rename = "type", default)]
    pub package_type: Option<SmolStr>,
    #[serde(default)]
    pub oca_bundle: Option<OcaBundle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcaBundle {
    #[serde(default)]
    pub v: Option<SmolStr>,
    #[serde(default)]
    pub bundle: Option<Bundle>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub v: Option<SmolStr>,
    #[serde(default)]
    pub d: Option<SmolStr>,
    #[serde(default)]
    pub capture_base: Option<CaptureBase>,
    #[serde(default)]
    pub overlays: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureBase {
    #[serde(default)]
    pub d: Option<SmolStr>,
    #[serde(rename = "type", default)]
    pub base_type: Option<SmolStr>,
    /// Attribute name to type string, in package order.
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub flagged_attributes: Vec<SmolStr>,
}

impl CaptureBase {
    /// Attribute names with their parsed types. Non-string type values are
    /// stringified first, the same way a loose JSON reader would see them.
    pub fn attribute_types(&self) -> impl Iterator<Item = (&str, AttributeType)> {
        self.attributes.iter().map(|(name, value)| {
            let ty = match value {
                serde_json::Value::String(s) => AttributeType::parse(s),
                other => AttributeType::parse(&other.to_string()),
            };
            (name.as_str(), ty)
        })
    }
}

/// A dependency is either a bare digest or an inline bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependency {
    Digest(SmolStr),
    Bundle(Box<DependencyBundle>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyBundle {
    #[serde(default)]
    pub d: Option<SmolStr>,
    #[serde(default)]
    pub v: Option<SmolStr>,
    #[serde(default)]
    pub capture_base: Option<CaptureBase>,
    #[serde(default)]
    pub bundle: Option<Bundle>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl DependencyBundle {
    pub fn capture_base(&self) -> Option<&CaptureBase> {
        self.capture_base
            .as_ref()
            .or_else(|| self.bundle.as_ref()?.capture_base.as_ref())
    }

    pub fn digest(&self) -> Option<&SmolStr> {
        self.d
            .as_ref()
            .or_else(|| self.capture_base()?.d.as_ref())
    }
}

impl Dependency {
    pub fn digest(&self) -> Option<&SmolStr> {
        match self {
            Dependency::Digest(d) => Some(d),
            Dependency::Bundle(bundle) => bundle.digest(),
        }
    }
}

impl OcaPackage {
    pub fn from_json(name: &str, text: &str) -> Result<Self, StencilError> {
        serde_json::from_str(text).map_err(|e| ParseError::new(name, text, e).into())
    }

    pub fn capture_base(&self) -> Option<&CaptureBase> {
        self.oca_bundle.as_ref()?.bundle.as_ref()?.capture_base.as_ref()
    }

    pub fn dependencies(&self) -> &[Dependency] {
        self.oca_bundle
            .as_ref()
            .map(|b| b.dependencies.as_slice())
            .unwrap_or_default()
    }

    pub fn attribute_count(&self) -> usize {
        self.capture_base().map_or(0, |cb| cb.attributes.len())
    }
}

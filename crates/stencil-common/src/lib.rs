//! stencil-common: package and catalog types shared by the stencil crates.
//!
//! This crate provides:
//! - `AttributeType` / `AttributeKind` - capture-base type strings
//! - `AttributeCatalog` - the validated attribute list the editor inserts from
//! - `OcaPackage` - serde model of an uploaded package
//! - `SchemaGraph` - schema nesting depth with cycle-safe traversal
//! - `PackageSlot` - the upload gate that enforces the depth ceiling
//! - `Config` - settings and their file store

pub mod attribute;
pub mod catalog;
pub mod config;
pub mod depth;
pub mod error;
pub mod gate;
pub mod package;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use crate::attribute::{AttributeKind, AttributeType};
pub use crate::catalog::{AttributeCatalog, AttributeDescriptor, InsertTarget};
pub use crate::config::{Config, EditorConfig, ExportConfig, FileStore, Loader, Saver};
pub use crate::depth::{DepthReport, SchemaGraph, SchemaNode};
pub use crate::error::{CatalogError, ParseError, StencilError};
pub use crate::gate::{AcceptedPackage, PackageSlot};
pub use crate::package::{CaptureBase, Dependency, OcaPackage};

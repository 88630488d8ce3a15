//! Schema nesting depth.
//!
//! A root schema sits at level 1. Every reference attribute and every
//! declared dependency opens one more level below the schema that holds it.
//! The depth of a package is the deepest level reachable from its root.
//!
//! The graph may contain cycles. Each path carries its own visited set of
//! digests, so a path never descends into a digest it already passed
//! through, and recursion depth is bounded by the number of distinct digests.
//!
//! Rules:
//! - a schema without a capture base has depth 0;
//! - references to digests that are not in the graph count as one level;
//! - revisiting a digest on the current path yields `level - 1`, the level
//!   of the schema that pointed back.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use smol_str::SmolStr;

use crate::error::StencilError;
use crate::package::{CaptureBase, Dependency, OcaPackage};

/// One schema in the dependency graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    pub digest: Option<SmolStr>,
    /// `None` when the schema has no capture base at all.
    pub attributes: Option<Vec<(SmolStr, SmolStr)>>,
    /// Digests this schema points at, through reference attributes or
    /// declared dependencies.
    pub references: BTreeSet<SmolStr>,
    /// Reference attributes that name no digest (plain `Reference`).
    pub opaque_references: usize,
}

impl SchemaNode {
    fn from_capture_base(
        digest: Option<SmolStr>,
        capture_base: Option<&CaptureBase>,
        dependencies: &[Dependency],
    ) -> Self {
        let mut node = SchemaNode {
            digest,
            ..Default::default()
        };

        if let Some(capture_base) = capture_base {
            let mut attributes = Vec::with_capacity(capture_base.attributes.len());
            for (name, ty) in capture_base.attribute_types() {
                if ty.is_reference() {
                    match &ty.target {
                        Some(target) => {
                            node.references.insert(target.clone());
                        }
                        None => node.opaque_references += 1,
                    }
                }
                attributes.push((SmolStr::new(name), SmolStr::new(ty.to_string())));
            }
            node.attributes = Some(attributes);
        }

        node.references
            .extend(dependencies.iter().filter_map(|d| d.digest().cloned()));
        node
    }

    fn has_children(&self) -> bool {
        self.opaque_references > 0 || !self.references.is_empty()
    }
}

/// A root schema plus every schema reachable through inline dependencies,
/// addressable by digest.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    root: SchemaNode,
    nodes: HashMap<SmolStr, SchemaNode>,
}

impl SchemaGraph {
    /// The root is also entered into the digest table so that references
    /// pointing back at it resolve.
    pub fn new(root: SchemaNode) -> Self {
        let mut graph = Self {
            root: root.clone(),
            nodes: HashMap::new(),
        };
        graph.insert(root);
        graph
    }

    /// Add a dependency schema. Nodes without a digest cannot be referenced
    /// and are ignored.
    pub fn with_node(mut self, node: SchemaNode) -> Self {
        self.insert(node);
        self
    }

    pub fn insert(&mut self, node: SchemaNode) {
        if let Some(digest) = node.digest.clone() {
            self.nodes.insert(digest, node);
        }
    }

    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    pub fn node(&self, digest: &str) -> Option<&SchemaNode> {
        self.nodes.get(digest)
    }

    /// Build the graph for a package, flattening inline dependency bundles
    /// at any nesting into the digest table. The first bundle seen for a
    /// digest wins.
    pub fn from_package(package: &OcaPackage) -> Self {
        let capture_base = package.capture_base();
        let root = SchemaNode::from_capture_base(
            capture_base.and_then(|cb| cb.d.clone()),
            capture_base,
            package.dependencies(),
        );

        let mut graph = SchemaGraph::new(root);
        let mut pending: Vec<&Dependency> = package.dependencies().iter().collect();
        while let Some(dependency) = pending.pop() {
            let Dependency::Bundle(bundle) = dependency else {
                continue;
            };
            let Some(digest) = bundle.digest() else {
                tracing::debug!("skipping dependency bundle without a digest");
                continue;
            };
            if graph.nodes.contains_key(digest) {
                continue;
            }
            graph.insert(SchemaNode::from_capture_base(
                Some(digest.clone()),
                bundle.capture_base(),
                &bundle.dependencies,
            ));
            pending.extend(bundle.dependencies.iter());
        }
        graph
    }

    /// Maximum nesting depth reachable from the root.
    pub fn depth(&self) -> usize {
        self.depth_of(&self.root, &HashSet::new(), 1)
    }

    /// Depth of `node` when reached at `level` along a path that already
    /// passed through `visited`.
    pub fn depth_of(&self, node: &SchemaNode, visited: &HashSet<SmolStr>, level: usize) -> usize {
        if node.attributes.is_none() {
            return 0;
        }

        let mut visited = visited.clone();
        if let Some(digest) = &node.digest {
            if visited.contains(digest) {
                tracing::trace!(target: "stencil::depth", %digest, level, "cycle guard");
                return level.saturating_sub(1);
            }
            visited.insert(digest.clone());
        }

        if !node.has_children() {
            return level;
        }

        let mut max_depth = level;
        if node.opaque_references > 0 {
            max_depth = max_depth.max(level + 1);
        }
        for reference in &node.references {
            // The edge itself opens a level even when the target is empty.
            let child_depth = match self.nodes.get(reference) {
                Some(child) => self.depth_of(child, &visited, level + 1).max(level + 1),
                None => level + 1,
            };
            max_depth = max_depth.max(child_depth);
        }
        max_depth
    }

    /// Check the depth against a ceiling.
    pub fn validate(&self, max_level: usize) -> DepthReport {
        let actual_level = self.depth();
        if actual_level > max_level {
            let error = StencilError::DepthExceeded {
                actual: actual_level,
                max: max_level,
            };
            tracing::debug!(target: "stencil::depth", actual_level, max_level, "schema too deep");
            DepthReport {
                valid: false,
                actual_level,
                error: Some(error.to_string()),
            }
        } else {
            DepthReport {
                valid: true,
                actual_level,
                error: None,
            }
        }
    }
}

/// Outcome of a depth check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthReport {
    pub valid: bool,
    pub actual_level: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DepthReport {
    pub fn into_result(self, max_level: usize) -> Result<usize, StencilError> {
        if self.valid {
            Ok(self.actual_level)
        } else {
            Err(StencilError::DepthExceeded {
                actual: self.actual_level,
                max: max_level,
            })
        }
    }
}

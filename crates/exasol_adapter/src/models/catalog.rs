//! Catalog tree models.
//!
//! Data structures the host's schema browser renders: a root database node
//! with system tables and user schemas beneath it.

use serde::{Deserialize, Serialize};

/// Type tag of the root node.
pub const TYPE_DATABASE: &str = "DB";
/// Type tag of the system tables grouping node.
pub const TYPE_SYSTEM: &str = "SYS";
/// Type tag of the schemas grouping node.
pub const TYPE_SCHEMAS: &str = "S";
/// Type tag of a single schema.
pub const TYPE_SCHEMA: &str = "s";
/// Type tag of a table.
pub const TYPE_TABLE: &str = "t";
/// Type tag of a view.
pub const TYPE_VIEW: &str = "v";

/// One node of the catalog tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique, hierarchical name (e.g. `"S"."T"."C"` or `/SYS`).
    pub qualified_identifier: String,
    /// SQL-ready reference; empty for grouping nodes.
    pub query_name: String,
    /// Text shown in the tree.
    pub label: String,
    /// Short type tag, or the raw column type for columns.
    pub type_label: String,
    /// Child nodes; empty for leaves.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CatalogItem>,
}

impl CatalogItem {
    /// Create a leaf node.
    pub fn new(
        qualified_identifier: impl Into<String>,
        query_name: impl Into<String>,
        label: impl Into<String>,
        type_label: impl Into<String>,
    ) -> Self {
        Self {
            qualified_identifier: qualified_identifier.into(),
            query_name: query_name.into(),
            label: label.into(),
            type_label: type_label.into(),
            children: Vec::new(),
        }
    }

    /// Attach children.
    pub fn with_children(mut self, children: Vec<CatalogItem>) -> Self {
        self.children = children;
        self
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first, pre-order walk over this node and its descendants.
    pub fn iter(&self) -> CatalogIter<'_> {
        CatalogIter { stack: vec![self] }
    }
}

/// Introspected catalog handed to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Top-level nodes (a single "Database" root).
    pub items: Vec<CatalogItem>,
}

impl Catalog {
    /// Wrap top-level nodes.
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    /// Depth-first walk over every node.
    pub fn iter(&self) -> CatalogIter<'_> {
        CatalogIter { stack: self.items.iter().rev().collect() }
    }

    /// Find a node by qualified identifier.
    pub fn find(&self, qualified_identifier: &str) -> Option<&CatalogItem> {
        self.iter().find(|item| item.qualified_identifier == qualified_identifier)
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the catalog has no nodes.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Pre-order iterator over catalog nodes.
pub struct CatalogIter<'a> {
    stack: Vec<&'a CatalogItem>,
}

impl<'a> Iterator for CatalogIter<'a> {
    type Item = &'a CatalogItem;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.stack.pop()?;
        self.stack.extend(item.children.iter().rev());
        Some(item)
    }
}

//! Query result models.

use serde::{Deserialize, Serialize};

/// A single cell as handed to the host's result renderer.
pub type Value = serde_json::Value;

/// One fetched row. The adapter never looks inside.
pub type Row = Vec<Value>;

/// Column metadata from a result descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name as reported by the server (e.g. "A")
    pub name: String,
    /// Printable type name (e.g. "DECIMAL")
    pub type_name: String,
}

impl ColumnInfo {
    /// Create column metadata.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self { name: name.into(), type_name: type_name.into() }
    }

    /// The `(name, type)` pair the host displays in the results header.
    pub fn as_pair(&self) -> (&str, &str) {
        (&self.name, &self.type_name)
    }
}

/// User-facing label of a transaction mode.
///
/// The Exasol connection never reports one: `transaction_mode()` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMode {
    /// Label shown in the host's footer.
    pub label: String,
}

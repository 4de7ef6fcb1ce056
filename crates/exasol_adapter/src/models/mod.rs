//! Data models for the Exasol adapter.
//!
//! This module contains the plain data structures:
//! - `config` - ConnectionConfig and the supported driver settings
//! - `query` - ColumnInfo, Row, TransactionMode
//! - `catalog` - Catalog tree for the schema browser
//! - `completion` - Autocomplete entries

pub mod catalog;
pub mod completion;
pub mod config;
pub mod query;

pub use catalog::{Catalog, CatalogItem};
pub use completion::Completion;
pub use config::{ConnectionConfig, SUPPORTED_SETTINGS};
pub use query::{ColumnInfo, Row, TransactionMode, Value};

//! Exasol adapter for a pluggable SQL client.
//!
//! This crate connects the host's adapter contracts to an Exasol driver:
//!
//! - **adapter**: Adapter factory built from the host's option set
//! - **options**: Declared adapter options and their validators
//! - **driver**: Driver traits and the scoped cursor guard
//! - **host**: Contracts the host programs against
//! - **services**: Connection lifecycle, cursors, catalog, completions
//! - **models**: Configuration, catalog and completion data types
//! - **error**: Error taxonomy the host understands
//! - **logging**: Structured logging setup

pub mod adapter;
pub mod driver;
pub mod error;
pub mod host;
pub mod logging;
pub mod models;
pub mod options;
pub mod services;

#[cfg(test)]
mod testing;

pub use adapter::ExasolAdapter;
pub use driver::{Driver, DriverConnection, DriverCursor, DriverError, ScopedCursor};
pub use error::{AdapterError, ErrorInfo};
pub use host::{Adapter, AdapterConnection, AdapterCursor};
pub use models::{Catalog, CatalogItem, ColumnInfo, Completion, ConnectionConfig, Row, TransactionMode};
pub use options::{AdapterOption, OptionMap, ADAPTER_OPTIONS};
pub use services::{Connection, Cursor};

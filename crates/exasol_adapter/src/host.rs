//! Contracts the host SQL client programs against.
//!
//! The host loads an [`Adapter`], asks it for an [`AdapterConnection`], and
//! receives [`AdapterCursor`]s from `execute`. The adapter has one concrete
//! implementation of each, so the traits use associated types rather than
//! trait objects.

use std::path::Path;
use std::sync::Arc;

use crate::error::AdapterError;
use crate::models::{Catalog, ColumnInfo, Completion, Row, TransactionMode};
use crate::options::{AdapterOption, OptionMap};

/// Entry point the host instantiates from its option set.
pub trait Adapter {
    /// Connection type produced by [`Adapter::connect`].
    type Connection: AdapterConnection;

    /// Options the host should offer for this adapter.
    fn options() -> &'static [AdapterOption];

    /// Open a live connection.
    fn connect(&self) -> Result<Self::Connection, AdapterError>;
}

/// A live session as seen by the host.
pub trait AdapterConnection {
    /// Cursor type returned by [`AdapterConnection::execute`].
    type Cursor: AdapterCursor;

    /// Execute one statement. `Ok(None)` means it succeeded without a result set.
    fn execute(&self, query: &str) -> Result<Option<Self::Cursor>, AdapterError>;

    /// Introspect the database.
    fn get_catalog(&self) -> Result<Catalog, AdapterError>;

    /// Extra completions for the query editor.
    fn get_completions(&self) -> Result<Arc<[Completion]>, AdapterError>;

    /// Export a query's result to `path`.
    fn copy(&self, _query: &str, _path: &Path, _format_name: &str, _options: &OptionMap) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported("copy"))
    }

    /// Return `text` if it parses, or an empty string.
    fn validate_sql(&self, _text: &str) -> Result<String, AdapterError> {
        Err(AdapterError::unsupported("validate_sql"))
    }

    /// Release the session. Safe to call more than once.
    fn close(&mut self) -> Result<(), AdapterError>;

    /// Currently active transaction mode, if the adapter has the concept.
    fn transaction_mode(&self) -> Option<TransactionMode> {
        None
    }

    /// Switch to the next transaction mode and return it.
    fn toggle_transaction_mode(&mut self) -> Option<TransactionMode> {
        None
    }
}

/// Result handle returned by `execute`.
pub trait AdapterCursor {
    /// `(name, type)` of each result column.
    fn columns(&self) -> Result<Vec<ColumnInfo>, AdapterError>;

    /// Bound the next fetch to `limit` rows.
    fn set_limit(&mut self, limit: usize) -> &mut Self;

    /// Fetch the rows (at most the limit, if one is set).
    fn fetchall(&mut self) -> Result<Vec<Row>, AdapterError>;
}

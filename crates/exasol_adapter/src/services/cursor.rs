//! Result cursor returned by `Connection::execute`.
//!
//! Wraps one open server-side cursor and gives the host:
//! - Column metadata from the result descriptor
//! - A single bounded (`set_limit`) or unbounded fetch
//! - Driver fetch errors translated into query errors

use std::time::Instant;

use uuid::Uuid;

use crate::driver::ScopedCursor;
use crate::error::AdapterError;
use crate::host::AdapterCursor;
use crate::models::{ColumnInfo, Row};

/// Handle on one statement's result set.
///
/// The server-side cursor is released after the first fetch, on a fetch
/// error, or when the `Cursor` is dropped, whichever comes first.
#[derive(Debug)]
pub struct Cursor {
    /// Open server-side cursor
    cursor: ScopedCursor,
    /// Query identifier for log correlation
    query_id: Uuid,
    /// Result descriptor captured at execute time
    columns: Option<Vec<ColumnInfo>>,
    /// Maximum rows for the next fetch
    limit: Option<usize>,
}

impl Cursor {
    pub(crate) fn new(cursor: ScopedCursor, query_id: Uuid) -> Self {
        let columns = cursor.description().map(|columns| columns.to_vec());
        Self { cursor, query_id, columns, limit: None }
    }

    /// Get the query identifier.
    pub fn query_id(&self) -> Uuid {
        self.query_id
    }

    /// Get the row limit applied to the next fetch.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Whether the result has already been pulled.
    pub fn is_consumed(&self) -> bool {
        self.cursor.is_closed()
    }
}

impl AdapterCursor for Cursor {
    fn columns(&self) -> Result<Vec<ColumnInfo>, AdapterError> {
        self.columns
            .clone()
            .ok_or_else(|| AdapterError::internal("cursor has no result descriptor"))
    }

    fn set_limit(&mut self, limit: usize) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    fn fetchall(&mut self) -> Result<Vec<Row>, AdapterError> {
        if self.cursor.is_closed() {
            return Err(AdapterError::internal("cursor results were already fetched"));
        }

        let start = Instant::now();
        let fetched = match self.limit {
            None => self.cursor.fetchall(),
            Some(limit) => self.cursor.fetchmany(limit),
        };
        self.cursor.release();

        let rows = fetched.map_err(|e| {
            tracing::warn!(query_id = %self.query_id, error = %e, "Fetch failed");
            AdapterError::query(e)
        })?;

        tracing::debug!(
            query_id = %self.query_id,
            row_count = rows.len(),
            limit = ?self.limit,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rows fetched"
        );

        Ok(rows)
    }
}

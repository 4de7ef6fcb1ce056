//! Keyword completions for the query editor.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::driver::{query_rows, value_as_bool, value_as_string, DriverConnection};
use crate::error::AdapterError;
use crate::models::Completion;

/// Reserved keywords of the connected server, alphabetically.
pub const KEYWORDS_SQL: &str =
    "SELECT DISTINCT KEYWORD, RESERVED FROM EXA_SQL_KEYWORDS WHERE RESERVED IS TRUE ORDER BY KEYWORD;";

/// Loads keyword completions once per connection and caches them.
pub struct CompletionsProvider {
    connection: Arc<dyn DriverConnection>,
    cache: Mutex<Option<Arc<[Completion]>>>,
}

impl CompletionsProvider {
    /// Bind a provider to a live driver connection.
    pub fn new(connection: Arc<dyn DriverConnection>) -> Self {
        Self { connection, cache: Mutex::new(None) }
    }

    /// All completions, querying the server on first use only.
    ///
    /// A failed query is returned unwrapped and leaves the cache empty.
    pub fn all(&self) -> Result<Arc<[Completion]>, AdapterError> {
        let mut cache = self.cache.lock();
        if let Some(completions) = cache.as_ref() {
            return Ok(Arc::clone(completions));
        }

        let completions: Arc<[Completion]> = self.load()?.into();
        tracing::debug!(count = completions.len(), "Keyword completions loaded");
        *cache = Some(Arc::clone(&completions));
        Ok(completions)
    }

    /// Whether the keyword query has already run successfully.
    pub fn is_loaded(&self) -> bool {
        self.cache.lock().is_some()
    }

    fn load(&self) -> Result<Vec<Completion>, AdapterError> {
        let rows = query_rows(self.connection.as_ref(), KEYWORDS_SQL)?;

        Ok(rows
            .iter()
            .filter_map(|row| match row.as_slice() {
                [keyword, reserved, ..] => Some(Completion::keyword(value_as_string(keyword), value_as_bool(reserved))),
                [keyword] => Some(Completion::keyword(value_as_string(keyword), true)),
                [] => None,
            })
            .collect())
    }
}

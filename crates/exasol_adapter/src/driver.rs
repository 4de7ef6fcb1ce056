//! Contract with the wire-level Exasol driver.
//!
//! The adapter does not speak the Exasol protocol itself. A driver crate
//! implements these traits (a DB-API style connection/cursor pair) and the
//! host passes it to [`crate::ExasolAdapter`].

use std::fmt;
use std::ops::{Deref, DerefMut};

use thiserror::Error;

use crate::models::{ColumnInfo, ConnectionConfig, Row, Value};

/// Error raised by the driver.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DriverError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DriverError {
    /// Create a driver error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), source: None }
    }

    /// Create a driver error wrapping a lower-level cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self { message: message.into(), source: Some(Box::new(source)) }
    }

    /// The driver's message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Opens sessions against an Exasol server.
pub trait Driver: Send + Sync {
    /// Driver name for logging.
    fn name(&self) -> &'static str;

    /// Establish a session with the given settings.
    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DriverConnection>, DriverError>;
}

/// A live driver session.
pub trait DriverConnection: Send + Sync {
    /// Open a new server-side cursor.
    fn cursor(&self) -> Result<Box<dyn DriverCursor>, DriverError>;

    /// Close the session. Cursors opened from it become unusable.
    fn close(&self) -> Result<(), DriverError>;
}

/// One server-side statement handle.
pub trait DriverCursor: Send {
    /// Execute a single statement.
    fn execute(&mut self, sql: &str) -> Result<(), DriverError>;

    /// Result descriptor of the last statement; `None` when it produced no result set.
    fn description(&self) -> Option<&[ColumnInfo]>;

    /// Fetch every remaining row.
    fn fetchall(&mut self) -> Result<Vec<Row>, DriverError>;

    /// Fetch at most `size` rows.
    fn fetchmany(&mut self, size: usize) -> Result<Vec<Row>, DriverError>;

    /// Release the server-side resources.
    fn close(&mut self) -> Result<(), DriverError>;
}

/// A driver cursor that is closed when dropped.
///
/// Every code path that opens a server-side cursor holds it through this
/// guard, so success, empty-result and error exits all release it.
pub struct ScopedCursor {
    cursor: Box<dyn DriverCursor>,
    closed: bool,
}

impl ScopedCursor {
    /// Take ownership of an open cursor.
    pub fn new(cursor: Box<dyn DriverCursor>) -> Self {
        Self { cursor, closed: false }
    }

    /// Open a cursor on `connection`.
    pub fn open(connection: &dyn DriverConnection) -> Result<Self, DriverError> {
        connection.cursor().map(Self::new)
    }

    /// Whether the cursor has been released.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Release the server-side cursor now. Later calls are no-ops.
    pub fn close(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.cursor.close()
    }

    /// Release the cursor, logging instead of returning a close failure.
    ///
    /// Used on paths that already carry a more relevant error or result.
    pub fn release(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "Failed to close server-side cursor");
        }
    }
}

impl Deref for ScopedCursor {
    type Target = dyn DriverCursor;

    fn deref(&self) -> &Self::Target {
        self.cursor.as_ref()
    }
}

impl DerefMut for ScopedCursor {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cursor.as_mut()
    }
}

impl Drop for ScopedCursor {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ScopedCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedCursor")
            .field("description", &self.cursor.description())
            .field("closed", &self.closed)
            .finish()
    }
}

/// Run an introspection query and return all rows.
///
/// Driver errors propagate unchanged; the cursor is released either way.
pub fn query_rows(connection: &dyn DriverConnection, sql: &str) -> Result<Vec<Row>, DriverError> {
    let mut cursor = ScopedCursor::open(connection)?;
    cursor.execute(sql)?;
    let rows = cursor.fetchall()?;
    cursor.close()?;
    Ok(rows)
}

/// Read a cell as text. Non-string scalars use their JSON rendering.
pub fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Read a cell as a boolean; numbers are true when non-zero.
pub fn value_as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "t" | "yes"),
        _ => false,
    }
}

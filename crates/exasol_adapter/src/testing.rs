//! In-memory driver for unit tests.
//!
//! Answers exact SQL texts with scripted results, records every statement,
//! and counts open server-side cursors so tests can assert none leak.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::driver::{Driver, DriverConnection, DriverCursor, DriverError};
use crate::models::{ColumnInfo, ConnectionConfig, Row};

/// Scripted outcome of one statement.
#[derive(Debug, Clone)]
pub enum Script {
    /// Statement yields a result set.
    Rows { columns: Vec<ColumnInfo>, rows: Vec<Row> },
    /// Statement succeeds without a result set (DDL/DML).
    NoResult,
    /// Execution fails with the message.
    Error(String),
    /// Execution succeeds but fetching fails.
    FetchError { columns: Vec<ColumnInfo>, message: String },
}

impl Script {
    pub fn rows(columns: &[(&str, &str)], rows: Vec<Row>) -> Self {
        Self::Rows { columns: columns.iter().map(|(n, t)| ColumnInfo::new(*n, *t)).collect(), rows }
    }

    /// One text column per row.
    pub fn names(column: &str, names: &[&str]) -> Self {
        Self::rows(
            &[(column, "VARCHAR(128) UTF8")],
            names.iter().map(|name| vec![Value::String((*name).to_string())]).collect(),
        )
    }

    pub fn error(message: &str) -> Self {
        Self::Error(message.to_string())
    }

    pub fn fetch_error(columns: &[(&str, &str)], message: &str) -> Self {
        Self::FetchError {
            columns: columns.iter().map(|(n, t)| ColumnInfo::new(*n, *t)).collect(),
            message: message.to_string(),
        }
    }
}

#[derive(Default)]
struct Shared {
    scripts: Mutex<HashMap<String, Script>>,
    executed: Mutex<Vec<String>>,
    connect_error: Mutex<Option<String>>,
    last_config: Mutex<Option<ConnectionConfig>>,
    open_cursors: AtomicUsize,
    cursor_closes: AtomicUsize,
    connections_opened: AtomicUsize,
    connections_closed: AtomicUsize,
}

/// Driver whose answers are set up by the test.
#[derive(Clone, Default)]
pub struct ScriptedDriver {
    shared: Arc<Shared>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, sql: impl Into<String>, script: Script) -> Self {
        self.set(sql, script);
        self
    }

    pub fn set(&self, sql: impl Into<String>, script: Script) {
        self.shared.scripts.lock().insert(sql.into(), script);
    }

    pub fn failing_connect(self, message: &str) -> Self {
        *self.shared.connect_error.lock() = Some(message.to_string());
        self
    }

    /// Connect with default settings.
    pub fn open(&self) -> Box<dyn DriverConnection> {
        self.connect(&ConnectionConfig::default()).expect("scripted connect")
    }

    pub fn executed(&self) -> Vec<String> {
        self.shared.executed.lock().clone()
    }

    pub fn executions_of(&self, sql: &str) -> usize {
        self.shared.executed.lock().iter().filter(|s| s.as_str() == sql).count()
    }

    pub fn open_cursors(&self) -> usize {
        self.shared.open_cursors.load(Ordering::SeqCst)
    }

    pub fn cursor_closes(&self) -> usize {
        self.shared.cursor_closes.load(Ordering::SeqCst)
    }

    pub fn connections_opened(&self) -> usize {
        self.shared.connections_opened.load(Ordering::SeqCst)
    }

    pub fn connections_closed(&self) -> usize {
        self.shared.connections_closed.load(Ordering::SeqCst)
    }

    pub fn last_config(&self) -> Option<ConnectionConfig> {
        self.shared.last_config.lock().clone()
    }
}

impl Driver for ScriptedDriver {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DriverConnection>, DriverError> {
        if let Some(message) = self.shared.connect_error.lock().clone() {
            return Err(DriverError::new(message));
        }
        *self.shared.last_config.lock() = Some(config.clone());
        self.shared.connections_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedConnection { shared: self.shared.clone(), closed: AtomicBool::new(false) }))
    }
}

struct ScriptedConnection {
    shared: Arc<Shared>,
    closed: AtomicBool,
}

impl DriverConnection for ScriptedConnection {
    fn cursor(&self) -> Result<Box<dyn DriverCursor>, DriverError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DriverError::new("connection is closed"));
        }
        self.shared.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedCursor {
            shared: self.shared.clone(),
            description: None,
            rows: VecDeque::new(),
            fetch_error: None,
            closed: false,
        }))
    }

    fn close(&self) -> Result<(), DriverError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.shared.connections_closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

struct ScriptedCursor {
    shared: Arc<Shared>,
    description: Option<Vec<ColumnInfo>>,
    rows: VecDeque<Row>,
    fetch_error: Option<String>,
    closed: bool,
}

impl DriverCursor for ScriptedCursor {
    fn execute(&mut self, sql: &str) -> Result<(), DriverError> {
        self.shared.executed.lock().push(sql.to_string());
        let script = self.shared.scripts.lock().get(sql).cloned();

        match script {
            None => Err(DriverError::new(format!("syntax error, unexpected statement [{sql}]"))),
            Some(Script::Error(message)) => Err(DriverError::new(message)),
            Some(Script::NoResult) => {
                self.description = None;
                Ok(())
            }
            Some(Script::Rows { columns, rows }) => {
                self.description = Some(columns);
                self.rows = rows.into();
                Ok(())
            }
            Some(Script::FetchError { columns, message }) => {
                self.description = Some(columns);
                self.fetch_error = Some(message);
                Ok(())
            }
        }
    }

    fn description(&self) -> Option<&[ColumnInfo]> {
        self.description.as_deref()
    }

    fn fetchall(&mut self) -> Result<Vec<Row>, DriverError> {
        if let Some(message) = self.fetch_error.clone() {
            return Err(DriverError::new(message));
        }
        Ok(self.rows.drain(..).collect())
    }

    fn fetchmany(&mut self, size: usize) -> Result<Vec<Row>, DriverError> {
        if let Some(message) = self.fetch_error.clone() {
            return Err(DriverError::new(message));
        }
        let size = size.min(self.rows.len());
        Ok(self.rows.drain(..size).collect())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        if !self.closed {
            self.closed = true;
            self.shared.open_cursors.fetch_sub(1, Ordering::SeqCst);
            self.shared.cursor_closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

//! Connection lifecycle and statement dispatch.
//!
//! A [`Connection`] owns:
//! - The driver session, opened by `connect()` and released by `close()`
//! - A catalog builder and a completions provider bound to that session
//! - The driver settings, filtered to the supported set

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::driver::{Driver, DriverConnection, ScopedCursor};
use crate::error::AdapterError;
use crate::host::AdapterConnection;
use crate::models::{Catalog, Completion, ConnectionConfig};
use crate::options::{OptionMap, ResolvedOptions};
use crate::services::catalog::CatalogBuilder;
use crate::services::completions::CompletionsProvider;
use crate::services::cursor::Cursor;

/// Everything that exists only while connected.
struct Session {
    driver_connection: Arc<dyn DriverConnection>,
    catalog: CatalogBuilder,
    completions: CompletionsProvider,
    connected_at: DateTime<Utc>,
}

/// A connection to one Exasol server.
///
/// Constructed disconnected; `connect()` opens the driver session. Not meant
/// to be used from several threads at once.
pub struct Connection {
    /// Identifier used in log fields
    id: Uuid,
    /// Driver that opens sessions
    driver: Arc<dyn Driver>,
    /// Settings passed to the driver
    config: ConnectionConfig,
    /// Message for the host to show after connecting
    init_message: Option<String>,
    /// Live session, if connected
    session: Option<Session>,
}

impl Connection {
    /// Create a disconnected connection with explicit driver settings.
    pub fn new(driver: Arc<dyn Driver>, config: ConnectionConfig) -> Self {
        Self { id: Uuid::new_v4(), driver, config, init_message: None, session: None }
    }

    /// Create a disconnected connection from a host option map.
    ///
    /// Unrecognized keys are dropped; invalid values are a config error.
    pub fn from_options(driver: Arc<dyn Driver>, options: &OptionMap) -> Result<Self, AdapterError> {
        let resolved = ResolvedOptions::resolve(options)?;
        let mut connection = Self::new(driver, ConnectionConfig::from_options(&resolved));
        connection.init_message = resolved.init_message;
        Ok(connection)
    }

    /// Set the message shown to the user after connecting.
    pub fn with_init_message(mut self, message: impl Into<String>) -> Self {
        self.init_message = Some(message.into());
        self
    }

    /// Get the connection identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the driver settings.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Message the host should show once connected, if any.
    pub fn init_message(&self) -> Option<&str> {
        self.init_message.as_deref()
    }

    /// Whether a driver session is open.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// When the current session was opened.
    pub fn connected_at(&self) -> Option<DateTime<Utc>> {
        self.session.as_ref().map(|session| session.connected_at)
    }

    /// Merge `overrides` into the settings and open the driver session.
    ///
    /// Only supported setting names are applied; others are dropped. Settings
    /// that fail validation leave the config unchanged. An open session is
    /// closed first.
    pub fn connect(&mut self, overrides: &OptionMap) -> Result<(), AdapterError> {
        let mut config = self.config.clone();
        config.apply_overrides(overrides)?;
        config.validate().map_err(AdapterError::config)?;
        self.config = config;

        if self.session.is_some() {
            tracing::debug!(connection_id = %self.id, "Reconnecting; closing previous session");
            self.close()?;
        }

        let driver_connection: Arc<dyn DriverConnection> = self
            .driver
            .connect(&self.config)
            .map_err(|e| {
                tracing::warn!(
                    connection_id = %self.id,
                    dsn = %self.config.display_dsn(),
                    error = %e,
                    "Connection failed"
                );
                AdapterError::connection_with_source(
                    format!("Failed to connect to {}", self.config.display_dsn()),
                    e,
                )
            })?
            .into();

        self.session = Some(Session {
            completions: CompletionsProvider::new(Arc::clone(&driver_connection)),
            catalog: CatalogBuilder::new(Arc::clone(&driver_connection)),
            driver_connection,
            connected_at: Utc::now(),
        });

        tracing::info!(
            connection_id = %self.id,
            dsn = %self.config.display_dsn(),
            driver = self.driver.name(),
            tls = self.config.tls,
            "Connected"
        );
        Ok(())
    }

    fn session(&self) -> Result<&Session, AdapterError> {
        self.session.as_ref().ok_or(AdapterError::NotConnected)
    }
}

impl AdapterConnection for Connection {
    type Cursor = Cursor;

    fn execute(&self, query: &str) -> Result<Option<Cursor>, AdapterError> {
        let session = self.session()?;
        let query_id = Uuid::new_v4();
        let start = Instant::now();

        tracing::debug!(connection_id = %self.id, query_id = %query_id, "Executing query");

        let mut cursor = ScopedCursor::open(session.driver_connection.as_ref()).map_err(|e| {
            tracing::warn!(query_id = %query_id, error = %e, "Failed to open cursor");
            AdapterError::query(e)
        })?;

        if let Err(e) = cursor.execute(query) {
            cursor.release();
            tracing::warn!(query_id = %query_id, error = %e, "Query failed");
            return Err(AdapterError::query(e));
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;
        let Some(column_count) = cursor.description().map(|columns| columns.len()) else {
            cursor.release();
            tracing::debug!(query_id = %query_id, elapsed_ms, "Query completed without result set");
            return Ok(None);
        };

        tracing::debug!(query_id = %query_id, elapsed_ms, column_count, "Query returned result set");
        Ok(Some(Cursor::new(cursor, query_id)))
    }

    fn get_catalog(&self) -> Result<Catalog, AdapterError> {
        self.session()?.catalog.build()
    }

    fn get_completions(&self) -> Result<Arc<[Completion]>, AdapterError> {
        self.session()?.completions.all()
    }

    fn close(&mut self) -> Result<(), AdapterError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        session.driver_connection.close().map_err(|e| {
            tracing::warn!(connection_id = %self.id, error = %e, "Failed to close connection");
            AdapterError::connection_with_source("Failed to close connection", e)
        })?;

        tracing::info!(connection_id = %self.id, "Connection closed");
        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(connection_id = %self.id, error = %e, "Error closing connection on drop");
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("driver", &self.driver.name())
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}

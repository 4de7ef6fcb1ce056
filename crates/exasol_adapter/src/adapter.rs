//! Adapter factory the host instantiates.

use std::sync::Arc;

use crate::driver::Driver;
use crate::error::AdapterError;
use crate::host::Adapter;
use crate::models::ConnectionConfig;
use crate::options::{AdapterOption, OptionMap, ResolvedOptions, ADAPTER_OPTIONS};
use crate::services::Connection;

/// Entry point for the host: validates options up front and opens connections.
pub struct ExasolAdapter {
    driver: Arc<dyn Driver>,
    config: ConnectionConfig,
    init_message: Option<String>,
}

impl ExasolAdapter {
    /// Name the host registers the adapter under.
    pub const NAME: &'static str = "exasol";

    /// Build an adapter from connection strings and host options.
    ///
    /// The first non-empty connection string, if any, replaces `host:port`
    /// as the DSN. Options may be a subset or superset of
    /// [`ADAPTER_OPTIONS`]; unknown keys are ignored. Invalid values fail here,
    /// before any network activity.
    pub fn new<S: AsRef<str>>(
        driver: Arc<dyn Driver>,
        conn_str: &[S],
        options: &OptionMap,
    ) -> Result<Self, AdapterError> {
        let resolved = ResolvedOptions::resolve(options)?;
        let mut config = ConnectionConfig::from_options(&resolved);

        if let Some(dsn) = conn_str.iter().map(|s| s.as_ref().trim()).find(|s| !s.is_empty()) {
            config = config.with_dsn(dsn);
        }
        config.validate().map_err(AdapterError::config)?;

        tracing::debug!(dsn = %config.display_dsn(), driver = driver.name(), "Adapter configured");
        Ok(Self { driver, config, init_message: resolved.init_message })
    }

    /// Get the driver settings new connections start from.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

impl Adapter for ExasolAdapter {
    type Connection = Connection;

    fn options() -> &'static [AdapterOption] {
        ADAPTER_OPTIONS
    }

    fn connect(&self) -> Result<Connection, AdapterError> {
        let mut connection = Connection::new(Arc::clone(&self.driver), self.config.clone());
        if let Some(message) = &self.init_message {
            connection = connection.with_init_message(message.clone());
        }
        connection.connect(&OptionMap::new())?;
        Ok(connection)
    }
}

//! Driver connection settings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AdapterError;
use crate::options::{OptionMap, ResolvedOptions};

/// Setting names the driver accepts. Anything else is dropped.
pub const SUPPORTED_SETTINGS: &[&str] = &[
    "dsn",
    "username",
    "password",
    "schema",
    "autocommit",
    "tls",
    "certificate_validation",
    "connect_timeout",
    "query_timeout",
];

/// Settings handed to the driver's `connect`.
///
/// Built once from the adapter options and only changed afterwards through
/// [`ConnectionConfig::apply_overrides`] at connect time. The password is
/// never serialized and never shown by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Server address, `host:port` or a host-supplied connection string
    pub dsn: String,
    /// Login user
    pub username: String,
    /// Login password
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Schema opened on connect (empty for none)
    pub schema: String,
    /// Autocommit override (None = driver default)
    pub autocommit: Option<bool>,
    /// Use TLS
    pub tls: bool,
    /// Validate the server certificate when using TLS
    pub certificate_validation: bool,
    /// Connect timeout in seconds, passed through to the driver
    #[serde(rename = "connect_timeout")]
    pub connect_timeout_secs: Option<u32>,
    /// Query timeout in seconds, passed through to the driver
    #[serde(rename = "query_timeout")]
    pub query_timeout_secs: Option<u32>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::from_options(&ResolvedOptions::default())
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("dsn", &self.dsn)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("schema", &self.schema)
            .field("autocommit", &self.autocommit)
            .field("tls", &self.tls)
            .field("certificate_validation", &self.certificate_validation)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("query_timeout_secs", &self.query_timeout_secs)
            .finish()
    }
}

impl ConnectionConfig {
    /// Translate validated adapter options into driver settings.
    pub fn from_options(options: &ResolvedOptions) -> Self {
        Self {
            dsn: options.dsn(),
            username: options.user.clone(),
            password: options.password.clone(),
            schema: options.schema.clone(),
            autocommit: None,
            tls: !options.unsecure,
            certificate_validation: !options.disable_certificate_validation,
            connect_timeout_secs: options.connect_timeout_secs,
            query_timeout_secs: options.query_timeout_secs,
        }
    }

    /// Replace the address.
    pub fn with_dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = dsn.into();
        self
    }

    /// Merge connect-time overrides into this config.
    ///
    /// Only keys in [`SUPPORTED_SETTINGS`] are applied; the rest are dropped
    /// silently. A supported key with a value of the wrong type is a config
    /// error and leaves `self` untouched. Returns the names that were applied.
    pub fn apply_overrides(&mut self, overrides: &OptionMap) -> Result<Vec<&'static str>, AdapterError> {
        let mut updated = self.clone();
        let mut applied = Vec::new();

        for (key, value) in overrides {
            let Some(name) = SUPPORTED_SETTINGS.iter().copied().find(|name| *name == key.as_str()) else {
                tracing::debug!(setting = %key, "Ignoring unsupported connection setting");
                continue;
            };

            match name {
                "dsn" => updated.dsn = expect_string(name, value)?,
                "username" => updated.username = expect_string(name, value)?,
                "password" => updated.password = expect_string(name, value)?,
                "schema" => updated.schema = expect_string(name, value)?,
                "autocommit" => updated.autocommit = expect_optional_bool(name, value)?,
                "tls" => updated.tls = expect_bool(name, value)?,
                "certificate_validation" => updated.certificate_validation = expect_bool(name, value)?,
                "connect_timeout" => updated.connect_timeout_secs = expect_optional_secs(name, value)?,
                "query_timeout" => updated.query_timeout_secs = expect_optional_secs(name, value)?,
                _ => continue,
            }
            applied.push(name);
        }

        *self = updated;
        Ok(applied)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.dsn.trim().is_empty() {
            return Err("DSN is required".to_string());
        }
        if self.username.is_empty() {
            return Err("Username is required".to_string());
        }
        Ok(())
    }

    /// Get the display connection string (without password).
    pub fn display_dsn(&self) -> String {
        if self.schema.is_empty() {
            format!("exa://{}@{}", self.username, self.dsn)
        } else {
            format!("exa://{}@{}/{}", self.username, self.dsn, self.schema)
        }
    }
}

fn type_error(name: &str, expected: &str, value: &Value) -> AdapterError {
    AdapterError::config(format!("Setting '{name}' must be {expected}, got {value}"))
}

fn expect_string(name: &str, value: &Value) -> Result<String, AdapterError> {
    value.as_str().map(String::from).ok_or_else(|| type_error(name, "a string", value))
}

fn expect_bool(name: &str, value: &Value) -> Result<bool, AdapterError> {
    value.as_bool().ok_or_else(|| type_error(name, "a boolean", value))
}

fn expect_optional_bool(name: &str, value: &Value) -> Result<Option<bool>, AdapterError> {
    if value.is_null() {
        return Ok(None);
    }
    expect_bool(name, value).map(Some)
}

fn expect_optional_secs(name: &str, value: &Value) -> Result<Option<u32>, AdapterError> {
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_u64()
        .and_then(|secs| u32::try_from(secs).ok())
        .map(Some)
        .ok_or_else(|| type_error(name, "a number of seconds", value))
}

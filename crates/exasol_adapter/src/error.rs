//! Error types for the Exasol adapter.
//!
//! One enum covers the whole taxonomy the host understands: configuration,
//! connection, query, unsupported operation, and raw introspection failures.

use thiserror::Error;

use crate::driver::DriverError;

/// Title attached to every query error shown to the user.
pub const QUERY_ERROR_TITLE: &str = "The Exasol adapter encountered an error while executing your query.";

/// Main error type for the adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// An option value failed its validator or had the wrong type.
    #[error("Config error: {message}")]
    Config {
        /// Human-readable error message.
        message: String,
    },

    /// Establishing or releasing the driver session failed.
    #[error("Connection error: {message}")]
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying driver error.
        #[source]
        source: Option<DriverError>,
    },

    /// An operation needing a live session was called before `connect()`.
    #[error("Not connected: call connect() first")]
    NotConnected,

    /// The driver rejected a statement or a fetch failed.
    #[error("{message}")]
    Query {
        /// Fixed, human-readable title.
        title: &'static str,
        /// Original driver message.
        message: String,
        /// Underlying driver error.
        #[source]
        source: Option<DriverError>,
    },

    /// The adapter does not offer this feature.
    #[error("Unsupported operation: {operation}")]
    Unsupported {
        /// Name of the operation (e.g. "copy").
        operation: &'static str,
    },

    /// An introspection query failed; propagated unwrapped.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Broken internal invariant.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
    },
}

impl AdapterError {
    // ========== Constructors ==========

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a new connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    /// Create a new connection error wrapping the driver error.
    pub fn connection_with_source(message: impl Into<String>, source: DriverError) -> Self {
        Self::Connection { message: message.into(), source: Some(source) }
    }

    /// Wrap a driver error raised while executing or fetching.
    pub fn query(source: DriverError) -> Self {
        Self::Query { title: QUERY_ERROR_TITLE, message: source.message().to_string(), source: Some(source) }
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    // ========== Methods ==========

    /// Whether the host should read this as "feature not offered".
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Whether this is a wrapped query error.
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query { .. })
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "Config",
            Self::Connection { .. } => "Connection",
            Self::NotConnected => "Connection",
            Self::Query { .. } => "Query",
            Self::Unsupported { .. } => "Unsupported",
            Self::Driver(_) => "Driver",
            Self::Internal { .. } => "Internal",
        }
    }

    /// Title for the host's error dialog.
    pub fn title(&self) -> String {
        match self {
            Self::Query { title, .. } => (*title).to_string(),
            _ => format!("{} Error", self.category()),
        }
    }

    /// Get actionable hint for the user.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { .. } => Some("Check the adapter options"),
            Self::Connection { .. } => Some("Check that the Exasol server is reachable and TLS settings match"),
            Self::NotConnected => None,
            Self::Query { .. } => None,
            Self::Unsupported { .. } => None,
            Self::Driver(_) => Some("The session may be broken; reconnect"),
            Self::Internal { .. } => Some("Please report this issue"),
        }
    }

    /// Convert to user-displayable error info.
    pub fn to_error_info(&self) -> ErrorInfo {
        let technical_detail = match self {
            Self::Connection { source: Some(source), .. } => Some(source.to_string()),
            Self::Unsupported { operation } => Some(format!("Operation: {operation}")),
            _ => None,
        };

        ErrorInfo {
            title: self.title(),
            message: self.to_string(),
            hint: self.hint().map(String::from),
            technical_detail,
        }
    }
}

/// User-displayable error information.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Dialog title (e.g. "Config Error", or the fixed query title).
    pub title: String,
    /// User-friendly message.
    pub message: String,
    /// Actionable suggestion.
    pub hint: Option<String>,
    /// Technical detail for "Show Details" expansion.
    pub technical_detail: Option<String>,
}

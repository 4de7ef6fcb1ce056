//! Declarative option schema for the adapter.
//!
//! The host hands the adapter a loosely typed option map assembled from the
//! command line, config files and environment variables. This module declares
//! which options exist, resolves aliases, validates values, and produces a
//! typed [`ResolvedOptions`]. Unknown keys are dropped without error.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::AdapterError;

/// Generic option map received from the host.
pub type OptionMap = serde_json::Map<String, Value>;

/// Option validator: `Ok(())` when the raw value is acceptable.
pub type Validator = fn(Option<&str>) -> Result<(), String>;

/// Default Exasol port.
pub const DEFAULT_PORT: u16 = 8563;

/// How the host should render and parse an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Free-form text value
    Text,
    /// Boolean switch
    Flag,
}

/// One declared adapter option.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AdapterOption {
    /// Canonical name (e.g. "disable-certificate-validation")
    pub name: &'static str,
    /// Help text
    pub description: &'static str,
    /// Short or alternative spellings (e.g. "-u", "--username")
    pub short_decls: &'static [&'static str],
    /// Default value as the host would type it
    pub default: Option<&'static str>,
    /// Text or flag
    pub kind: OptionKind,
    /// Value check run before any network activity
    #[serde(skip)]
    pub validator: Option<Validator>,
}

impl AdapterOption {
    /// Run this option's validator, if it has one.
    pub fn validate(&self, raw: Option<&str>) -> Result<(), String> {
        match self.validator {
            Some(validator) => validator(raw),
            None => Ok(()),
        }
    }

    fn key(&self) -> String {
        normalize_key(self.name)
    }
}

/// All options the adapter declares.
pub static ADAPTER_OPTIONS: &[AdapterOption] = &[
    AdapterOption {
        name: "host",
        description: "The host name or IP address of the Exasol server.",
        short_decls: &["-h"],
        default: Some("localhost"),
        kind: OptionKind::Text,
        validator: None,
    },
    AdapterOption {
        name: "port",
        description: "The TCP/IP port of the Exasol server. Must be an integer.",
        short_decls: &["-p"],
        default: Some("8563"),
        kind: OptionKind::Text,
        validator: Some(port_validator),
    },
    AdapterOption {
        name: "schema",
        description: "The schema name to open when connecting to the Exasol server.",
        short_decls: &["-s"],
        default: Some(""),
        kind: OptionKind::Text,
        validator: None,
    },
    AdapterOption {
        name: "user",
        description: "The user name used to authenticate with the Exasol server.",
        short_decls: &["-u", "--username"],
        default: Some("sys"),
        kind: OptionKind::Text,
        validator: None,
    },
    AdapterOption {
        name: "password",
        description: "The password to authenticate the user with the Exasol server.",
        short_decls: &[],
        default: Some("exasol"),
        kind: OptionKind::Text,
        validator: None,
    },
    AdapterOption {
        name: "unsecure",
        description: "Disable transport layer security.",
        short_decls: &[],
        default: Some("False"),
        kind: OptionKind::Flag,
        validator: Some(flag_validator),
    },
    AdapterOption {
        name: "disable-certificate-validation",
        description: "Disable certificate validation connecting to server using tls.",
        short_decls: &[],
        default: Some("False"),
        kind: OptionKind::Flag,
        validator: Some(flag_validator),
    },
    AdapterOption {
        name: "connect-timeout",
        description: "Seconds to wait for the connection to be established. Passed to the driver.",
        short_decls: &[],
        default: None,
        kind: OptionKind::Text,
        validator: Some(int_validator),
    },
    AdapterOption {
        name: "query-timeout",
        description: "Seconds a single query may run. Passed to the driver.",
        short_decls: &[],
        default: None,
        kind: OptionKind::Text,
        validator: Some(int_validator),
    },
    AdapterOption {
        name: "init-message",
        description: "Message shown to the user once the connection is established.",
        short_decls: &[],
        default: None,
        kind: OptionKind::Text,
        validator: None,
    },
];

/// Accepts an absent value or anything that parses as an integer.
pub fn int_validator(value: Option<&str>) -> Result<(), String> {
    match value {
        None => Ok(()),
        Some(s) => s
            .trim()
            .parse::<i64>()
            .map(|_| ())
            .map_err(|_| format!("Cannot convert {s} to an int!")),
    }
}

/// Integer validator that also requires a valid TCP port.
pub fn port_validator(value: Option<&str>) -> Result<(), String> {
    int_validator(value)?;
    match value {
        Some(s) if s.trim().parse::<u16>().is_err() => {
            Err(format!("Port {s} is out of range (0-65535)!"))
        }
        _ => Ok(()),
    }
}

/// Accepts an absent value or a recognizable boolean spelling.
pub fn flag_validator(value: Option<&str>) -> Result<(), String> {
    match value {
        None => Ok(()),
        Some(s) => parse_flag(s).map(|_| ()).ok_or_else(|| format!("Cannot convert {s} to a flag!")),
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Fold a host-supplied key into lookup form: no leading dashes, `_` separators.
fn normalize_key(key: &str) -> String {
    key.trim_start_matches('-').replace('-', "_").to_ascii_lowercase()
}

/// Resolve a host key (canonical name or alias) to its declared option.
pub fn find_option(key: &str) -> Option<&'static AdapterOption> {
    let key = normalize_key(key);
    ADAPTER_OPTIONS.iter().find(|option| {
        option.key() == key || option.short_decls.iter().any(|decl| normalize_key(decl) == key)
    })
}

/// Stringify a JSON scalar the way the host would have typed it.
fn raw_value(name: &str, value: &Value) -> Result<Option<String>, AdapterError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Array(_) | Value::Object(_) => {
            Err(AdapterError::config(format!("Option '{name}' must be a single value")))
        }
    }
}

/// Typed view of the host's options after validation and defaulting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    /// Server host name
    pub host: String,
    /// Server port
    pub port: u16,
    /// Schema opened on connect (empty for none)
    pub schema: String,
    /// Login user
    pub user: String,
    /// Login password
    pub password: String,
    /// TLS disabled
    pub unsecure: bool,
    /// Certificate validation disabled
    pub disable_certificate_validation: bool,
    /// Pass-through connect timeout
    pub connect_timeout_secs: Option<u32>,
    /// Pass-through query timeout
    pub query_timeout_secs: Option<u32>,
    /// Message shown after connecting
    pub init_message: Option<String>,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            schema: String::new(),
            user: "sys".to_string(),
            password: "exasol".to_string(),
            unsecure: false,
            disable_certificate_validation: false,
            connect_timeout_secs: None,
            query_timeout_secs: None,
            init_message: None,
        }
    }
}

impl ResolvedOptions {
    /// Validate `options` against [`ADAPTER_OPTIONS`] and fill in defaults.
    ///
    /// Keys that match no declared option are dropped. A declared option whose
    /// value fails its validator yields [`AdapterError::Config`].
    pub fn resolve(options: &OptionMap) -> Result<Self, AdapterError> {
        let mut values: HashMap<&'static str, String> = HashMap::new();

        for (key, value) in options {
            let Some(option) = find_option(key) else {
                tracing::debug!(option = %key, "Ignoring unrecognized option");
                continue;
            };

            let raw = raw_value(option.name, value)?;
            option.validate(raw.as_deref()).map_err(|message| {
                AdapterError::config(format!("Invalid value for option '{}': {message}", option.name))
            })?;

            if let Some(raw) = raw {
                values.insert(option.name, raw);
            }
        }

        let mut resolved = Self::default();
        for (name, raw) in values {
            match name {
                "host" => resolved.host = raw,
                "port" => resolved.port = parse_number(name, &raw)?,
                "schema" => resolved.schema = raw,
                "user" => resolved.user = raw,
                "password" => resolved.password = raw,
                "unsecure" => resolved.unsecure = parse_flag(&raw).unwrap_or(false),
                "disable-certificate-validation" => {
                    resolved.disable_certificate_validation = parse_flag(&raw).unwrap_or(false)
                }
                "connect-timeout" => resolved.connect_timeout_secs = Some(parse_number(name, &raw)?),
                "query-timeout" => resolved.query_timeout_secs = Some(parse_number(name, &raw)?),
                "init-message" => resolved.init_message = Some(raw),
                _ => {}
            }
        }

        Ok(resolved)
    }

    /// `host:port` address for the driver.
    pub fn dsn(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, AdapterError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| AdapterError::config(format!("Invalid value for option '{name}': {raw} is out of range")))
}

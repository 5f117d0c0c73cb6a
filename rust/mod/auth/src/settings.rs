//! Namespaced settings lookup.
//!
//! Settings are a flat `KEY -> value` map assembled once at startup from the
//! config file and `TOLLGATE_*` environment variables. Each consumer reads
//! through an [`AppSettings`] bound to its namespace prefix, so
//! `AppSettings::new(REGISTRATION_PREFIX, ..).setting("CREATE_USER_SCHEMA", ..)`
//! looks up `TOLLGATE_REGISTRATION_CREATE_USER_SCHEMA`.

use std::collections::HashMap;

use thiserror::Error;

/// Namespace for settings owned by the token/auth side.
pub const CORE_PREFIX: &str = "TOLLGATE_";

/// Namespace for settings owned by account registration.
pub const REGISTRATION_PREFIX: &str = "TOLLGATE_REGISTRATION_";

/// Fatal configuration problems. The server must not start with any of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}: no component registered under `{path}`")]
    UnknownComponent { key: String, path: String },

    #[error("{key}: `{path}` must implement `{contract}` (provides: {provided})")]
    ContractMismatch {
        key: String,
        path: String,
        contract: &'static str,
        provided: String,
    },

    #[error("invalid JWT key material: {0}")]
    InvalidKey(String),
}

/// Read-only view of the settings map under one prefix.
#[derive(Debug, Clone, Copy)]
pub struct AppSettings<'a> {
    prefix: &'a str,
    values: &'a HashMap<String, String>,
}

impl<'a> AppSettings<'a> {
    pub fn new(prefix: &'a str, values: &'a HashMap<String, String>) -> Self {
        Self { prefix, values }
    }

    /// Fully-qualified key for a setting name.
    pub fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Configured value for `name`, or `default` when unset or blank.
    pub fn setting(&self, name: &str, default: &str) -> String {
        self.values
            .get(&self.key(name))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    }
}

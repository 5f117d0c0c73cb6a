pub mod jwt;
pub mod password;
pub mod schema;
pub mod session;
pub mod user;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use tollgate_core::FieldErrors;
use tollgate_sql::{SQLError, SQLStore, Value};

use crate::registry::ComponentRegistry;
use crate::schema_control::SchemaControl;
use crate::settings::ConfigError;

pub use jwt::{JwtConfig, JwtKeys};

/// Auth service error type.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {}", .0.summary())]
    Invalid(FieldErrors),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
}

impl From<FieldErrors> for AuthError {
    fn from(e: FieldErrors) -> Self {
        AuthError::Invalid(e)
    }
}

impl From<SQLError> for AuthError {
    fn from(e: SQLError) -> Self {
        if e.is_constraint() {
            AuthError::Conflict(e.to_string())
        } else {
            AuthError::Storage(e.to_string())
        }
    }
}

impl From<AuthError> for tollgate_core::ServiceError {
    fn from(e: AuthError) -> Self {
        use tollgate_core::ServiceError;
        if matches!(e, AuthError::Storage(_) | AuthError::Internal(_) | AuthError::Config(_)) {
            tracing::error!(error = %e, "auth request failed");
        }
        match e {
            AuthError::NotFound(m) => ServiceError::NotFound(m),
            AuthError::Conflict(m) => ServiceError::Conflict(m),
            AuthError::Invalid(errors) => ServiceError::InvalidFields(errors),
            AuthError::Unauthorized(m) => ServiceError::Unauthorized(m),
            AuthError::Storage(m) => ServiceError::Storage(m),
            AuthError::Internal(m) => ServiceError::Internal(m),
            AuthError::Config(e) => ServiceError::Internal(e.to_string()),
        }
    }
}

/// CSRF cookie attributes.
#[derive(Debug, Clone)]
pub struct CsrfConfig {
    pub cookie_name: String,
    pub cookie_path: String,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    /// `Lax`, `Strict` or `None`.
    pub cookie_samesite: String,
    pub cookie_max_age_secs: i64,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: "csrftoken".to_string(),
            cookie_path: "/".to_string(),
            cookie_domain: None,
            cookie_secure: false,
            cookie_samesite: "Lax".to_string(),
            cookie_max_age_secs: 60 * 60 * 24 * 7 * 52, // one year
        }
    }
}

/// Configuration for the auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    /// Access token lifetime in seconds (default: 5 min).
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds (default: 1 day).
    pub refresh_token_ttl: i64,
    pub csrf: CsrfConfig,
    /// Flat settings map (`TOLLGATE_*` keys) read by the schema resolver.
    pub settings: HashMap<String, String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            access_token_ttl: 300,
            refresh_token_ttl: 86400,
            csrf: CsrfConfig::default(),
            settings: HashMap::new(),
        }
    }
}

/// The Auth service. Holds storage, signing keys and the resolved schemas.
pub struct AuthService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) config: AuthConfig,
    pub(crate) keys: JwtKeys,
    pub(crate) schemas: SchemaControl,
}

impl AuthService {
    /// Create a new AuthService.
    ///
    /// Resolves the schema settings and loads the JWT keys before touching
    /// storage, so a misconfigured deployment fails here rather than on
    /// the first request.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        config: AuthConfig,
        registry: &ComponentRegistry,
    ) -> Result<Arc<Self>, AuthError> {
        let schemas = SchemaControl::new(&config.settings, registry)?;
        let keys = JwtKeys::from_config(&config.jwt)?;
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self {
            sql,
            config,
            keys,
            schemas,
        }))
    }

    pub fn schemas(&self) -> &SchemaControl {
        &self.schemas
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    // ── Generic record helpers ──

    /// Insert a record as JSON into a table with indexed columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), AuthError> {
        let json = serde_json::to_string(record)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            cols.push(col);
            placeholders.push(format!("?{}", i + 3));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params)?;
        Ok(())
    }

    /// Get a record by id, deserializing the JSON `data` column.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, AuthError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        self.find_one(&sql, &[Value::Text(id.to_string())])?
            .ok_or_else(|| AuthError::NotFound(format!("{}/{}", table, id)))
    }

    /// Run a `SELECT data ...` query and decode the first row, if any.
    pub(crate) fn find_one<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<T>, AuthError> {
        let rows = self.sql.query(sql, params)?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };
        let data = row
            .get_str("data")
            .ok_or_else(|| AuthError::Internal("missing data column".into()))?;
        serde_json::from_str(data)
            .map(Some)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Update a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), AuthError> {
        let json = serde_json::to_string(record)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            sets.push(format!("{} = ?{}", col, i + 2));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            sets.join(", "),
            id_idx,
        );

        if self.sql.exec(&sql, &params)? == 0 {
            return Err(AuthError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }
}

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use rusqlite::types::ValueRef;
use tracing::debug;

use crate::error::SQLError;
use crate::traits::{Row, SQLStore, Value};

/// SqliteStore is a SQLStore implementation backed by rusqlite (bundled SQLite).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, SQLError> {
        let conn = Connection::open(path)
            .map_err(|e| SQLError::Connection(e.to_string()))?;

        // WAL for concurrent readers; foreign keys are off by default in SQLite.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| SQLError::Connection(e.to_string()))?;

        debug!("opened sqlite database at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self, SQLError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SQLError> {
        self.conn
            .lock()
            .map_err(|e| SQLError::Connection(format!("connection lock poisoned: {}", e)))
    }
}

fn to_sql(v: &Value) -> &dyn rusqlite::types::ToSql {
    match v {
        Value::Null => &rusqlite::types::Null,
        Value::Integer(i) => i,
        Value::Real(f) => f,
        Value::Text(s) => s,
        Value::Blob(b) => b,
    }
}

/// Map a rusqlite error, separating constraint violations from other failures.
fn exec_error(e: rusqlite::Error) -> SQLError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            SQLError::Constraint(e.to_string())
        }
        _ => SQLError::Execution(e.to_string()),
    }
}

fn row_value_at(row: &rusqlite::Row, idx: usize) -> Result<Value, rusqlite::Error> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    })
}

impl SQLStore for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        let conn = self.lock()?;
        let bound: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(to_sql).collect();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| SQLError::Query(e.to_string()))?;

        let column_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rows = stmt
            .query_map(bound.as_slice(), |row| {
                let mut columns = Vec::with_capacity(column_names.len());
                for (i, name) in column_names.iter().enumerate() {
                    columns.push((name.clone(), row_value_at(row, i)?));
                }
                Ok(Row { columns })
            })
            .map_err(|e| SQLError::Query(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| SQLError::Query(e.to_string()))
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        let conn = self.lock()?;
        let bound: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(to_sql).collect();
        let affected = conn.execute(sql, bound.as_slice()).map_err(exec_error)?;
        Ok(affected as u64)
    }

    fn exec_batch(&self, sql: &str) -> Result<(), SQLError> {
        let conn = self.lock()?;
        conn.execute_batch(sql).map_err(exec_error)
    }
}

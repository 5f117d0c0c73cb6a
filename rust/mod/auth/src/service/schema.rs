use tollgate_sql::SQLStore;

use crate::service::AuthError;

/// Initialize the SQLite schema for users and sessions.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), AuthError> {
    sql.exec_batch(
        "
        -- Users: JSON record plus the columns we filter on.
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL COLLATE NOCASE UNIQUE,
            email TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1,
            data TEXT NOT NULL,
            date_joined TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

        -- Sessions: one per issued token pair.
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            revoked INTEGER NOT NULL DEFAULT 0,
            data TEXT NOT NULL,
            issued_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
        ",
    )?;
    Ok(())
}

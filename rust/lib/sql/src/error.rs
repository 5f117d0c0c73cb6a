use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    /// A UNIQUE / NOT NULL / FOREIGN KEY constraint rejected the statement.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("connection error: {0}")]
    Connection(String),
}

impl SQLError {
    pub fn is_constraint(&self) -> bool {
        matches!(self, SQLError::Constraint(_))
    }
}

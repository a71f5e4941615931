//! Storage-layer error model.

use thiserror::Error;

/// Failure at the store boundary.
///
/// Domain-visible conditions (missing rows) are not errors; store methods
/// report them as `Ok(None)` / `Ok(false)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected a write (CHECK, UNIQUE, NOT NULL, FOREIGN KEY).
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Any other storage failure (connection, IO, decode).
    #[error("storage error: {0}")]
    Storage(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        let constraint = match &err {
            sqlx::Error::Database(db) => matches!(
                db.kind(),
                ErrorKind::UniqueViolation
                    | ErrorKind::ForeignKeyViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation
            )
            .then(|| db.message().to_string()),
            _ => None,
        };

        match constraint {
            Some(msg) => StoreError::Constraint(msg),
            None => StoreError::Storage(err),
        }
    }
}

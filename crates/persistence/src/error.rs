//! Storage error classification.
//!
//! Repositories return [`StoreError`] instead of raw `sqlx::Error` so that
//! handlers can map constraint violations to user-facing responses without
//! inspecting PostgreSQL error codes themselves.

use thiserror::Error;

/// Error returned by repository operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested row does not exist.
    #[error("row not found")]
    NotFound,

    /// An INSERT or UPDATE collided with a unique constraint.
    #[error("unique constraint violated ({})", constraint.as_deref().unwrap_or("unknown"))]
    UniqueViolation { constraint: Option<String> },

    /// A row is still referenced by another table.
    #[error("foreign key constraint violated ({})", constraint.as_deref().unwrap_or("unknown"))]
    ForeignKeyViolation { constraint: Option<String> },

    /// The operation targets a bracelet an admin retired.
    #[error("bracelet is retired")]
    BraceletRetired,

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }

    /// Name of the violated constraint, when PostgreSQL reported one.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            StoreError::UniqueViolation { constraint }
            | StoreError::ForeignKeyViolation { constraint } => constraint.as_deref(),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) => {
                // PostgreSQL error code 23505 = unique_violation, 23503 = foreign_key_violation
                match db_err.code().as_deref() {
                    Some("23505") => StoreError::UniqueViolation {
                        constraint: db_err.constraint().map(str::to_string),
                    },
                    Some("23503") => StoreError::ForeignKeyViolation {
                        constraint: db_err.constraint().map(str::to_string),
                    },
                    _ => StoreError::Database(sqlx::Error::Database(db_err)),
                }
            }
            other => StoreError::Database(other),
        }
    }
}

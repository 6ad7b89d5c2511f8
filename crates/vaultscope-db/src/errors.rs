use std::fmt::Display;

use diesel::result::Error as DieselError;
use thiserror::Error;

/// Errors raised while building the pool or applying migrations.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("cannot init database pool: {0}")]
    Pool(String),
    #[error("cannot run database migrations: {0}")]
    Migrations(String),
}

/// Runtime database error, always tagged with the operation that failed.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("failed to get a pooled connection for '{operation}': {message}")]
    Pool { operation: String, message: String },

    #[error("connection interaction aborted for '{operation}': {message}")]
    Interaction { operation: String, message: String },

    #[error("record not found in '{operation}'")]
    NotFound { operation: String },

    #[error("query failed in '{operation}': {message}")]
    Query { operation: String, message: String },
}

impl DatabaseError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn operation(&self) -> &str {
        match self {
            Self::Pool { operation, .. }
            | Self::Interaction { operation, .. }
            | Self::NotFound { operation }
            | Self::Query { operation, .. } => operation,
        }
    }

    /// Replace the placeholder operation set by the `From<DieselError>` conversion.
    #[must_use]
    pub fn with_operation(self, operation: impl Display) -> Self {
        let operation = operation.to_string();
        match self {
            Self::Pool { message, .. } => Self::Pool { operation, message },
            Self::Interaction { message, .. } => Self::Interaction { operation, message },
            Self::NotFound { .. } => Self::NotFound { operation },
            Self::Query { message, .. } => Self::Query { operation, message },
        }
    }
}

impl From<DieselError> for DatabaseError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound {
                operation: "unknown".to_string(),
            },
            other => Self::Query {
                operation: "unknown".to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diesel_not_found_keeps_operation_after_tagging() {
        let err = DatabaseError::from(DieselError::NotFound).with_operation("load vault v1");
        assert!(err.is_not_found());
        assert_eq!(err.operation(), "load vault v1");
    }

    #[test]
    fn test_other_diesel_errors_become_query_errors() {
        let err = DatabaseError::from(DieselError::RollbackTransaction);
        assert!(!err.is_not_found());
        assert!(matches!(err, DatabaseError::Query { .. }));
    }
}

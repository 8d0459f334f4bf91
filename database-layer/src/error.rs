use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// No connection could be checked out of the pool before the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Database error: {0}")]
    SqlxError(sqlx::Error),
}

impl DatabaseError {
    /// Whether the caller may retry the operation later without changing it
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DatabaseError::PoolExhausted | DatabaseError::ConnectionFailed(_)
        )
    }

    /// Whether the error is a unique-constraint violation (SQLSTATE 23505)
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::SqlxError(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some("23505")
            }
            _ => false,
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::PoolClosed => {
                DatabaseError::ConnectionFailed("connection pool is closed".to_string())
            }
            sqlx::Error::Io(io) => DatabaseError::ConnectionFailed(io.to_string()),
            other => DatabaseError::SqlxError(other),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationError(error.to_string())
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_retryable() {
        let error = DatabaseError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(error, DatabaseError::PoolExhausted));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_io_failure_maps_to_connection_failed() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let error = DatabaseError::from(sqlx::Error::Io(io));
        assert!(matches!(error, DatabaseError::ConnectionFailed(_)));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_row_not_found_is_not_retryable() {
        let error = DatabaseError::from(sqlx::Error::RowNotFound);
        assert!(!error.is_retryable());
        assert!(!error.is_unique_violation());
    }
}

use database_layer::DatabaseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    /// Missing or malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced patient, item, assignment or archive record does not exist
    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Whether the failure is transient (pool exhausted, connection lost)
    pub fn is_retryable(&self) -> bool {
        matches!(self, BillingError::Database(db) if db.is_retryable())
    }
}

impl From<sqlx::Error> for BillingError {
    fn from(error: sqlx::Error) -> Self {
        BillingError::Database(DatabaseError::from(error))
    }
}

pub type BillingResult<T> = Result<T, BillingError>;

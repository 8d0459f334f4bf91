use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use billing_service::BillingError;
use database_layer::DatabaseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Seconds a client should wait before retrying a 503
pub const RETRY_AFTER_SECS: u64 = 2;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error type/code
    #[schema(example = "not_found")]
    pub error_type: String,
    /// Human-readable error message
    #[schema(example = "Patient not found")]
    pub error: String,
    /// Timestamp when error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Authentication { message: String },

    #[error("{resource_type} not found")]
    NotFound { resource_type: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Database(db_err) if db_err.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) | ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::Authentication { .. } => "authentication_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::Database(db_err) if db_err.is_retryable() => "service_unavailable",
            ApiError::Database(_) => "database_error",
            ApiError::Internal { .. } => "internal_error",
        }
    }

    /// Message safe to show a client; database and internal details stay in the logs
    fn public_message(&self) -> String {
        match self {
            ApiError::Database(db_err) if db_err.is_retryable() => {
                "Database is temporarily unavailable, please retry shortly".to_string()
            }
            ApiError::Database(_) | ApiError::Internal { .. } => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        // Log the error with correlation ID
        error!(
            error_id = %error_id,
            error_type = %self.error_type(),
            status_code = %status_code.as_u16(),
            error = %self,
            "API error occurred"
        );

        let body = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            error: self.public_message(),
            timestamp: chrono::Utc::now(),
        };

        let mut response = (status_code, Json(body)).into_response();
        if status_code == StatusCode::SERVICE_UNAVAILABLE {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
        }
        response
    }
}

impl From<BillingError> for ApiError {
    fn from(error: BillingError) -> Self {
        match error {
            BillingError::Validation(message) => ApiError::Validation { message },
            BillingError::NotFound(resource_type) => ApiError::NotFound { resource_type },
            BillingError::Conflict(message) => ApiError::Conflict { message },
            BillingError::Authentication(message) => ApiError::Authentication { message },
            BillingError::Database(db_err) => ApiError::Database(db_err),
            BillingError::Internal(message) => ApiError::Internal { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_errors_map_to_status_codes() {
        let cases = [
            (BillingError::validation("quantity must be at least 1"), StatusCode::BAD_REQUEST),
            (BillingError::not_found("Patient"), StatusCode::NOT_FOUND),
            (BillingError::Conflict("taken".into()), StatusCode::CONFLICT),
            (BillingError::Authentication("nope".into()), StatusCode::UNAUTHORIZED),
            (BillingError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                BillingError::Database(DatabaseError::TransactionFailed("commit".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (billing_error, expected) in cases {
            assert_eq!(ApiError::from(billing_error).status_code(), expected);
        }
    }

    #[test]
    fn test_pool_exhaustion_is_retryable_503() {
        let response = ApiError::from(DatabaseError::PoolExhausted).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            &RETRY_AFTER_SECS.to_string()
        );
    }

    #[test]
    fn test_database_details_are_not_exposed() {
        let err = ApiError::from(DatabaseError::MigrationError("relation \"patients\" does not exist".into()));
        assert_eq!(err.public_message(), "Internal server error");

        let not_found = ApiError::not_found("Patient");
        assert_eq!(not_found.public_message(), "Patient not found");
    }
}

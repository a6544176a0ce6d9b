use crate::database::DatabaseError;
use crate::payments::PaymentError;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// PostgreSQL SQLSTATE codes the repositories translate
mod pg_code {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const CHECK_VIOLATION: &str = "23514";
}

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("SQL error: {0}")]
    Sqlx(#[from] SqlxError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request conflicts with existing state (duplicate claim, replayed match)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Payment gateway failures; the message is shown to the caller
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("{0}")]
    Message(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// HTTP status for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::Unauthorized(_) => 401,
            AppError::Forbidden(_) => 403,
            AppError::NotFound(_) => 404,
            AppError::Conflict(_) => 409,
            AppError::ExternalService(_) => 502,
            AppError::Database(_)
            | AppError::Sqlx(_)
            | AppError::Config(_)
            | AppError::Message(_) => 500,
        }
    }

    /// Machine readable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::ExternalService(_) => "UPSTREAM_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Whether the message is safe to show to the caller
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500 || matches!(self, AppError::ExternalService(_))
    }
}

/// Errors raised by the repositories
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Query error: {0}")]
    Query(SqlxError),

    #[error("Record not found")]
    NotFound(String),

    /// Unique key already taken (claimed reward, recorded match, used reference)
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Query(e) => AppError::Sqlx(e),
            RepositoryError::Duplicate(msg) => AppError::Conflict(msg),
            RepositoryError::ConstraintViolation(msg) | RepositoryError::InvalidInput(msg) => {
                AppError::Validation(msg)
            }
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        let (code, message) = match &err {
            SqlxError::RowNotFound => {
                return RepositoryError::NotFound("Record not found".to_string())
            }
            SqlxError::Database(db_err) => (
                db_err.code().map(|c| c.to_string()),
                db_err.message().to_string(),
            ),
            _ => return RepositoryError::Query(err),
        };

        match code.as_deref() {
            Some(pg_code::UNIQUE_VIOLATION) => RepositoryError::Duplicate(message),
            Some(pg_code::FOREIGN_KEY_VIOLATION) | Some(pg_code::CHECK_VIOLATION) => {
                RepositoryError::ConstraintViolation(message)
            }
            _ => RepositoryError::Query(err),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::UnknownPlan(plan) => {
                AppError::Validation(format!("Unknown plan: {}", plan))
            }
            PaymentError::InvalidAmount(msg) => AppError::Validation(msg),
            other => AppError::ExternalService(other.to_string()),
        }
    }
}

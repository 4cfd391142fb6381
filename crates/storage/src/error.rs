use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Write conflict: {0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }

    /// Serialization failure or deadlock reported by Postgres.
    pub fn is_write_conflict(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if matches!(e.code().as_deref(), Some("40001") | Some("40P01"))
        )
    }
}

/// Errors surfaced by the account and rating workflows.
///
/// Every variant maps to one user-visible failure; none of them leaves a
/// partial write behind.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound => Self::NotFound,
            StorageError::Conflict(msg) | StorageError::ConstraintViolation(msg) => {
                Self::Conflict(msg)
            }
            other => Self::Storage(other),
        }
    }
}

impl ServiceError {
    /// Validation failure on a single field, for checks the derive can't express.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        let mut error = ValidationError::new("invalid");
        error.message = Some(message.into().into());

        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        Self::Validation(errors)
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

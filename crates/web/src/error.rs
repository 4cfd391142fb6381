use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::fmt;
use storage::error::{ServiceError, StorageError};
use validator::ValidationErrors;

use crate::media::UploadError;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound,
    Conflict(String),
    Upload(UploadError),
    Internal(String),
    /// The request could not be extracted (malformed body, query or path).
    Rejected { status: StatusCode, message: String },
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            Self::NotFound => write!(f, "Resource not found"),
            Self::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Self::Upload(e) => write!(f, "Upload failed: {}", e),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
            Self::Rejected { message, .. } => write!(f, "Rejected request: {}", message),
        }
    }
}

impl WebError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::ConstraintViolation(_))
            | Self::Storage(StorageError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upload(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected { status, .. } => *status,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Storage(StorageError::NotFound) | Self::NotFound => {
                json!({
                    "error": "Resource not found"
                })
            }
            Self::Storage(StorageError::ConstraintViolation(msg))
            | Self::Storage(StorageError::Conflict(msg))
            | Self::Conflict(msg) => {
                json!({
                    "error": msg
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::Rejected { message: msg, .. } => {
                json!({
                    "error": msg
                })
            }
            Self::Upload(e) => {
                tracing::warn!("Upload failed: {}", e);
                json!({
                    "error": e.to_string(),
                    "hint": "Try the upload again or submit a link to the track instead"
                })
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

impl From<UploadError> for WebError {
    fn from(error: UploadError) -> Self {
        Self::Upload(error)
    }
}

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        // Type mismatches are input errors like any other validation failure.
        let status = match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => StatusCode::BAD_REQUEST,
            status => status,
        };
        Self::Rejected {
            status,
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for WebError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for WebError {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<ServiceError> for WebError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Validation(errors) => Self::Validation(errors),
            ServiceError::InvalidCredentials => {
                Self::Unauthorized("Invalid username or password".to_string())
            }
            ServiceError::Unauthenticated => {
                Self::Unauthorized("Missing or expired session".to_string())
            }
            ServiceError::Permission(msg) => Self::Forbidden(msg),
            ServiceError::NotFound => Self::NotFound,
            ServiceError::Conflict(msg) => Self::Conflict(msg),
            ServiceError::PasswordHash(msg) => Self::Internal(msg),
            ServiceError::Storage(e) => Self::Storage(e),
        }
    }
}

pub type WebResult<T> = Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(error: impl Into<WebError>) -> StatusCode {
        error.into().status_code()
    }

    #[test]
    fn test_service_errors_map_to_statuses() {
        assert_eq!(
            status(ServiceError::invalid("historical_reference", "too high")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(ServiceError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(ServiceError::Unauthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(ServiceError::Permission("artist".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status(ServiceError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status(ServiceError::Conflict("taken".to_string())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_storage_errors_map_to_statuses() {
        assert_eq!(status(StorageError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status(StorageError::Conflict("concurrent update".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(StorageError::Database(sqlx::Error::PoolTimedOut)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upload_errors_are_bad_gateway_with_hint() {
        let error = WebError::from(UploadError::MissingUrl);
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
        assert!(error.body().get("hint").is_some());
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let error = WebError::from(StorageError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(error.body(), json!({"error": "An internal error occurred"}));
    }

    #[test]
    fn test_hashing_failures_are_internal() {
        let error = WebError::from(ServiceError::PasswordHash("salt too short".to_string()));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.body(), json!({"error": "An internal error occurred"}));
    }

    #[test]
    fn test_rejections_keep_status_and_json_shape() {
        let error = WebError::Rejected {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".to_string(),
        };
        assert_eq!(error.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error.body(), json!({"error": "length limit exceeded"}));
    }

    #[test]
    fn test_validation_body_lists_fields() {
        let error = WebError::from(ServiceError::invalid("link", "a link or a file is required"));
        let body = error.body();
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(
            body["details"][0],
            "link: a link or a file is required"
        );
    }
}

/// Error handling for the API server
///
/// All handlers return [`ApiResult`]. Every error body has the same shape:
///
/// ```json
/// { "error": "NOT_FOUND", "message": "Task not found" }
/// ```
///
/// `error` is the stable code clients branch on; `details` is present only
/// for per-field validation failures.
///
/// # Example
///
/// ```no_run
/// use axum::Json;
/// use parallel_api::error::ApiResult;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parallel_shared::error::{ErrorKind, ServiceError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// No actor or bad credentials (401)
    Unauthenticated(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Bad request (400)
    BadRequest(String),

    /// Per-field validation failures (422)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Operation would break an invariant (422)
    InvalidOperation(String),

    /// Conflict (409), e.g. joining a workspace twice
    Conflict(String),

    /// Asset store failure (502)
    UploadFailed(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code (e.g. "FORBIDDEN")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// Stable kind reported to clients
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            ApiError::Forbidden(_) => ErrorKind::Forbidden,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => ErrorKind::BadUserInput,
            ApiError::InvalidOperation(_) => ErrorKind::InvalidOperation,
            ApiError::Conflict(_) => ErrorKind::AlreadyExists,
            ApiError::UploadFailed(_) => ErrorKind::UploadFailed,
            ApiError::InternalError(_) => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError(_) | ApiError::InvalidOperation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UploadFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::UploadFailed(msg) => write!(f, "Upload failed: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.kind().as_str().to_string();

        let (message, details) = match self {
            ApiError::ValidationError(errors) => {
                ("Request validation failed".to_string(), Some(errors))
            }
            ApiError::InternalError(msg) => {
                // Logged, never exposed
                tracing::error!("Internal error: {}", msg);
                ("An internal error occurred".to_string(), None)
            }
            ApiError::Unauthenticated(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::InvalidOperation(msg)
            | ApiError::Conflict(msg)
            | ApiError::UploadFailed(msg) => (msg, None),
        };

        let body = Json(ErrorResponse {
            error: code,
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert domain errors to API errors
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthenticated => ApiError::Unauthenticated(err.to_string()),
            ServiceError::InvalidCredentials => ApiError::Unauthenticated(err.to_string()),
            ServiceError::Forbidden(msg) => ApiError::Forbidden(msg),
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::BadUserInput(msg) => ApiError::BadRequest(msg),
            ServiceError::InvalidOperation(msg) => ApiError::InvalidOperation(msg),
            ServiceError::AlreadyExists(msg) => ApiError::Conflict(msg),
            ServiceError::UploadFailed(msg) => ApiError::UploadFailed(msg),
            ServiceError::Internal(msg) => ApiError::InternalError(msg),
            ServiceError::Database(e) => ApiError::InternalError(format!("Database error: {}", e)),
        }
    }
}

/// Convert `validator` failures into per-field details
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");
    }

    #[test]
    fn test_service_error_mapping() {
        let cases = [
            (ServiceError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ServiceError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ServiceError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (ServiceError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (ServiceError::BadUserInput("bad".into()), StatusCode::BAD_REQUEST),
            (ServiceError::InvalidOperation("last".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ServiceError::AlreadyExists("dup".into()), StatusCode::CONFLICT),
            (ServiceError::UploadFailed("down".into()), StatusCode::BAD_GATEWAY),
            (ServiceError::Database(sqlx::Error::PoolTimedOut), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            let kind = err.kind();
            let api = ApiError::from(err);
            assert_eq!(api.status(), status);
            assert_eq!(api.kind(), kind);
        }
    }

    #[tokio::test]
    async fn test_internal_error_body_hides_detail() {
        let response = ApiError::InternalError("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "INTERNAL");
        assert_eq!(json["message"], "An internal error occurred");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_validation_error() {
        let errors = vec![
            ValidationErrorDetail {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "Password must be at least 8 characters".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.kind(), ErrorKind::BadUserInput);
    }
}

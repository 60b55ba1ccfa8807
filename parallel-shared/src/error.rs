/// Common error type for domain operations
///
/// Every operation in [`crate::services`] returns [`ServiceResult`]. The
/// variants map one-to-one onto the stable error kinds exposed to clients,
/// so the transport never has to guess what a failure means.
///
/// Store errors that carry a known constraint name are translated into the
/// kind the caller can act on (duplicate membership, duplicate e-mail);
/// everything else stays a `Database` error and is treated as transient.

use serde::Serialize;

use crate::auth::authorization::AuthzError;
use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::upload::UploadError;

/// Result alias for domain operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Stable, transport-independent error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    NotFound,
    BadUserInput,
    InvalidOperation,
    AlreadyExists,
    UploadFailed,
    Internal,
}

impl ErrorKind {
    /// Returns the stable error code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::BadUserInput => "BAD_USER_INPUT",
            ErrorKind::InvalidOperation => "INVALID_OPERATION",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::UploadFailed => "UPLOAD_FAILED",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Error returned by domain operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No actor was resolved for the request
    #[error("Not authenticated")]
    Unauthenticated,

    /// Sign-in with an unknown e-mail or a wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Actor lacks the required membership or role
    #[error("{0}")]
    Forbidden(String),

    /// Resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Input was rejected
    #[error("{0}")]
    BadUserInput(String),

    /// Operation would violate an invariant
    #[error("{0}")]
    InvalidOperation(String),

    /// Resource already exists
    #[error("{0}")]
    AlreadyExists(String),

    /// Asset store rejected or failed the upload
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Failure in a local primitive (hashing, signing)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Store failure; retryable by the caller
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl ServiceError {
    /// Gets the stable kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Unauthenticated | ServiceError::InvalidCredentials => {
                ErrorKind::Unauthenticated
            }
            ServiceError::Forbidden(_) => ErrorKind::Forbidden,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::BadUserInput(_) => ErrorKind::BadUserInput,
            ServiceError::InvalidOperation(_) => ErrorKind::InvalidOperation,
            ServiceError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            ServiceError::UploadFailed(_) => ErrorKind::UploadFailed,
            ServiceError::Internal(_) | ServiceError::Database(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn not_found(what: &str) -> Self {
        ServiceError::NotFound(format!("{} not found", what))
    }

    pub(crate) fn bad_input(msg: impl Into<String>) -> Self {
        ServiceError::BadUserInput(msg.into())
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.constraint() {
                Some("workspace_members_pkey") => {
                    return ServiceError::AlreadyExists(
                        "Already a member of this workspace".to_string(),
                    );
                }
                Some("users_email_key") => {
                    return ServiceError::BadUserInput("Email already exists".to_string());
                }
                Some("tasks_project_workspace_fkey") => {
                    return ServiceError::BadUserInput(
                        "Project does not belong to this workspace".to_string(),
                    );
                }
                _ => {}
            }
        }

        ServiceError::Database(err)
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotMember(_) => {
                ServiceError::Forbidden("Not a member of this workspace".to_string())
            }
            AuthzError::InsufficientRole { .. } => {
                ServiceError::Forbidden("Insufficient permissions".to_string())
            }
            AuthzError::LastMember(_) => ServiceError::InvalidOperation(
                "Workspace must keep at least one member".to_string(),
            ),
            AuthzError::DatabaseError(err) => ServiceError::from(err),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        ServiceError::Internal(format!("Token operation failed: {}", err))
    }
}

impl From<UploadError> for ServiceError {
    fn from(err: UploadError) -> Self {
        ServiceError::UploadFailed(err.to_string())
    }
}

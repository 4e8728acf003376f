/// Error Handling Module
///
/// This module provides the error types for the whole service:
/// 1. Domain-specific errors for each layer of the auth core
///    (credentials, access tokens, refresh tokens, header extraction)
/// 2. Persistence errors raised by the store implementations
/// 3. A unified `AppError` used by route handlers
/// 4. HTTP response mapping with structured error logging

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::time::Duration;
use thiserror::Error;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("{0} is empty")]
    EmptyField(String),
    #[error("{0} is too short (minimum {1} characters)")]
    TooShort(String, usize),
    #[error("{0} is too long (maximum {1} characters)")]
    TooLong(String, usize),
    #[error("{0} has invalid format")]
    InvalidFormat(String),
    #[error("{0} contains suspicious content")]
    SuspiciousContent(String),
}

/// Credential hashing and verification errors
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password does not match the stored hash")]
    CredentialMismatch,
    #[error("stored password hash is malformed")]
    MalformedHash(#[source] bcrypt::BcryptError),
    #[error("password hashing failed")]
    HashingFailure(#[source] bcrypt::BcryptError),
}

/// Access token (JWT) errors
#[derive(Debug, Error)]
pub enum AccessTokenError {
    #[error("access token is malformed")]
    MalformedToken,
    #[error("access token signature is invalid")]
    SignatureInvalid,
    #[error("access token has expired")]
    TokenExpired,
    #[error("access token subject is not a valid user id")]
    MalformedSubject,
    #[error("access token signing failed")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Refresh token lifecycle errors
#[derive(Debug, Error)]
pub enum RefreshTokenError {
    #[error("secure random source is unavailable")]
    EntropySourceFailure(#[source] rand::Error),
    #[error("refresh token store failure")]
    PersistenceFailure(#[source] StoreError),
    #[error("refresh token not found")]
    TokenNotFound,
    #[error("refresh token has been revoked")]
    TokenRevoked,
    #[error("refresh token has expired")]
    TokenExpired,
}

impl From<StoreError> for RefreshTokenError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => RefreshTokenError::TokenNotFound,
            other => RefreshTokenError::PersistenceFailure(other),
        }
    }
}

/// Header extraction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no authorization was provided")]
    MissingAuthorization,
}

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("duplicate entry: {0}")]
    Conflict(String),
    #[error("store call exceeded its deadline of {0:?}")]
    Timeout(Duration),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("database error")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::PoolTimedOut => {
                StoreError::Unavailable("connection pool timed out".to_string())
            }
            sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some("23505") => {
                StoreError::Conflict(db_err.message().to_string())
            }
            // foreign key violation: the referenced row is gone
            sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some("23503") => {
                StoreError::NotFound
            }
            other => StoreError::Database(other),
        }
    }
}

/// Authentication and authorization outcomes at the HTTP boundary.
///
/// These are deliberately coarse: the reason behind a rejection stays in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Forbidden")]
    Forbidden,
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type returned by route handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    AccessToken(#[from] AccessTokenError),
    #[error(transparent)]
    RefreshToken(#[from] RefreshTokenError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ExtractError> for AppError {
    fn from(_: ExtractError) -> Self {
        AppError::Auth(AuthError::Unauthorized)
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

fn store_classification(err: &StoreError) -> (StatusCode, &'static str, &'static str) {
    match err {
        StoreError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found"),
        StoreError::Conflict(_) => (StatusCode::CONFLICT, "DUPLICATE_ENTRY", "Duplicate entry"),
        StoreError::Timeout(_) | StoreError::Unavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Database service temporarily unavailable",
        ),
        StoreError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            "Database error occurred",
        ),
    }
}

const UNAUTHORIZED: (StatusCode, &str, &str) =
    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Unauthorized");
const AUTHENTICATION_FAILED: (StatusCode, &str, &str) = (
    StatusCode::UNAUTHORIZED,
    "AUTHENTICATION_FAILED",
    "Authentication failed",
);
const INTERNAL: (StatusCode, &str, &str) = (
    StatusCode::INTERNAL_SERVER_ERROR,
    "INTERNAL_ERROR",
    "Internal server error",
);

impl AppError {
    /// Status, client-facing code and client-facing message.
    ///
    /// Every token and credential failure collapses into one of two uniform
    /// 401 answers so a caller cannot tell missing, malformed and expired apart.
    fn classify(&self) -> (StatusCode, &'static str, String) {
        let (status, code, message) = match self {
            AppError::Validation(e) => {
                return (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Auth(AuthError::Unauthorized) => UNAUTHORIZED,
            AppError::Auth(AuthError::AuthenticationFailed) => AUTHENTICATION_FAILED,
            AppError::Auth(AuthError::Forbidden) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", "Forbidden")
            }
            AppError::NotFound(what) => {
                return (StatusCode::NOT_FOUND, "NOT_FOUND", format!("{} not found", what))
            }
            AppError::Store(e) => store_classification(e),
            AppError::Credential(CredentialError::HashingFailure(_)) => INTERNAL,
            AppError::Credential(_) => AUTHENTICATION_FAILED,
            AppError::AccessToken(AccessTokenError::Signing(_)) => INTERNAL,
            AppError::AccessToken(_) => UNAUTHORIZED,
            AppError::RefreshToken(e) => match e {
                RefreshTokenError::TokenNotFound
                | RefreshTokenError::TokenRevoked
                | RefreshTokenError::TokenExpired => UNAUTHORIZED,
                RefreshTokenError::EntropySourceFailure(_) => INTERNAL,
                RefreshTokenError::PersistenceFailure(StoreError::NotFound) => INTERNAL,
                RefreshTokenError::PersistenceFailure(e) => store_classification(e),
            },
            AppError::Internal(_) => INTERNAL,
        };
        (status, code, message.to_string())
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code, message) = self.classify();
        let error_response = ErrorResponse::new(
            request_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );
        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        let (status, code, _) = self.classify();
        if status.is_server_error() {
            tracing::error!(
                request_id = request_id,
                code = code,
                error = %self,
                source = ?std::error::Error::source(self),
                "Request failed"
            );
        } else {
            tracing::warn!(
                request_id = request_id,
                code = code,
                error = %self,
                "Request rejected"
            );
        }
    }
}

/// Implement ResponseError for Actix-web integration
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        self.classify().0
    }
}

// ============================================================================
// 4. ERROR CONTEXT
// ============================================================================

/// Operation context attached to request logs
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
        }
    }

    pub fn with_user_id(mut self, user_id: String) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField("email".to_string());
        assert_eq!(err.to_string(), "email is empty");
    }

    #[test]
    fn test_missing_store_record_maps_to_token_not_found() {
        let err: RefreshTokenError = StoreError::NotFound.into();
        assert!(matches!(err, RefreshTokenError::TokenNotFound));

        let err: RefreshTokenError = StoreError::Timeout(Duration::from_millis(10)).into();
        assert!(matches!(
            err,
            RefreshTokenError::PersistenceFailure(StoreError::Timeout(_))
        ));
    }

    #[test]
    fn test_token_failures_are_indistinguishable_to_clients() {
        let errors = vec![
            AppError::from(ExtractError::MissingAuthorization),
            AppError::from(AccessTokenError::MalformedToken),
            AppError::from(AccessTokenError::SignatureInvalid),
            AppError::from(AccessTokenError::TokenExpired),
            AppError::from(AccessTokenError::MalformedSubject),
            AppError::from(RefreshTokenError::TokenNotFound),
            AppError::from(RefreshTokenError::TokenRevoked),
            AppError::from(RefreshTokenError::TokenExpired),
        ];

        for err in errors {
            let (status, body) = <AppError as ErrorHandler>::error_response(&err, "req-1");
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{:?}", err);
            assert_eq!(body.code, "UNAUTHORIZED");
            assert_eq!(body.message, "Unauthorized");
        }
    }

    #[test]
    fn test_credential_failures_are_uniform() {
        let mismatch = AppError::from(CredentialError::CredentialMismatch);
        let unknown_user = AppError::Auth(AuthError::AuthenticationFailed);

        let (_, a) = <AppError as ErrorHandler>::error_response(&mismatch, "a");
        let (_, b) = <AppError as ErrorHandler>::error_response(&unknown_user, "b");
        assert_eq!(a.code, b.code);
        assert_eq!(a.message, b.message);
        assert_eq!(a.status, 401);
    }

    #[test]
    fn test_persistence_failures_are_server_faults() {
        let timeout = AppError::from(RefreshTokenError::PersistenceFailure(StoreError::Timeout(
            Duration::from_secs(1),
        )));
        assert!(timeout.status_code().is_server_error());

        let unavailable = AppError::from(StoreError::Unavailable("down".to_string()));
        assert_eq!(unavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_duplicate_entry_is_conflict() {
        let err = AppError::from(StoreError::Conflict("users_email_key".to_string()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_error_response_creation() {
        let response = ErrorResponse::new(
            "test-123".to_string(),
            "Test error".to_string(),
            "TEST_ERROR".to_string(),
            400,
        );

        assert_eq!(response.error_id, "test-123");
        assert_eq!(response.code, "TEST_ERROR");
        assert_eq!(response.status, 400);
    }

    #[test]
    fn test_error_context_creation() {
        let ctx = ErrorContext::new("login");
        assert_eq!(ctx.operation, "login");
        assert!(ctx.user_id.is_none());

        let ctx = ctx.with_user_id("user-123".to_string());
        assert_eq!(ctx.user_id, Some("user-123".to_string()));
    }
}

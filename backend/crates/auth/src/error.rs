//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::otp::OtpError;
use thiserror::Error;

use crate::application::token::TokenError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login failed. Unknown handle, inactive user and wrong password all
    /// map here so callers cannot enumerate accounts.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Current password did not match on password change
    #[error("Current password is incorrect")]
    InvalidPassword,

    #[error("User not found")]
    UserNotFound,

    /// User name or email already taken
    #[error("User name or email already exists")]
    Conflict,

    /// Structural input validation failed
    #[error("{0}")]
    Validation(String),

    /// Value-object rejection, with its suggested action
    #[error("{}", .0.message())]
    InvalidInput(AppError),

    /// Filter rejection before a token could be checked
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Authenticated, but a filter predicate refused the claims
    #[error("{0}")]
    Forbidden(String),

    /// Claims were requested from a request the filter never admitted
    #[error("Authentication required")]
    UnauthenticatedAccess,

    #[error("Invalid or expired token")]
    Token(#[from] TokenError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Random source unavailable: {0}")]
    EntropyUnavailable(String),

    /// Raised only while constructing the service
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_)
            | AuthError::InvalidInput(_)
            | AuthError::Conflict
            | AuthError::InvalidPassword => {
                StatusCode::BAD_REQUEST
            }
            AuthError::InvalidCredentials
            | AuthError::Unauthorized(_)
            | AuthError::UnauthenticatedAccess
            | AuthError::Token(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Database(_)
            | AuthError::EntropyUnavailable(_)
            | AuthError::ConfigInvalid(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            // Duplicate registration is reported as a validation failure
            AuthError::Validation(_)
            | AuthError::InvalidInput(_)
            | AuthError::Conflict
            | AuthError::InvalidPassword => {
                ErrorKind::BadRequest
            }
            AuthError::InvalidCredentials
            | AuthError::Unauthorized(_)
            | AuthError::UnauthenticatedAccess
            | AuthError::Token(_) => ErrorKind::Unauthorized,
            AuthError::Forbidden(_) => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Database(_)
            | AuthError::EntropyUnavailable(_)
            | AuthError::ConfigInvalid(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side details are not echoed to clients.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Database(_) | AuthError::EntropyUnavailable(_) | AuthError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            AuthError::InvalidInput(err) => err.clone(),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Structural input rejection, whichever layer caught it
    pub fn is_validation(&self) -> bool {
        matches!(self, AuthError::Validation(_) | AuthError::InvalidInput(_))
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::EntropyUnavailable(msg) => {
                tracing::error!(message = %msg, "OS random source failed");
            }
            AuthError::ConfigInvalid(msg) | AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::Token(e) if e.is_expired() => {
                tracing::debug!("Expired bearer token");
            }
            AuthError::Token(e) => {
                tracing::warn!(reason = %e, "Rejected bearer token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::InvalidInput(err),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<OtpError> for AuthError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::EntropyUnavailable(msg) => AuthError::EntropyUnavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::Conflict.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Token(TokenError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Forbidden("nope".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::EntropyUnavailable("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_status_matches_kind() {
        let errors = [
            AuthError::InvalidCredentials,
            AuthError::InvalidPassword,
            AuthError::UserNotFound,
            AuthError::Conflict,
            AuthError::Validation("bad".into()),
            AuthError::InvalidInput(AppError::bad_request("bad")),
            AuthError::Unauthorized("missing"),
            AuthError::Forbidden("denied".into()),
            AuthError::UnauthenticatedAccess,
            AuthError::Token(TokenError::BadSignature),
            AuthError::ConfigInvalid("x".into()),
            AuthError::Internal("x".into()),
        ];
        for err in errors {
            assert_eq!(err.status_code().as_u16(), err.kind().status_code(), "{err:?}");
        }
    }

    #[test]
    fn test_token_errors_share_one_message() {
        for e in [
            TokenError::Malformed,
            TokenError::BadSignature,
            TokenError::Expired,
            TokenError::NotYetValid,
            TokenError::UnsupportedAlgorithm("none".into()),
        ] {
            assert_eq!(
                AuthError::from(e).to_app_error().message(),
                "Invalid or expired token"
            );
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AuthError::Internal("pool exhausted at 10.0.0.3".into());
        assert_eq!(err.to_app_error().message(), "Internal server error");
    }

    #[test]
    fn test_from_bad_request_app_error() {
        let err = AuthError::from(
            AppError::bad_request("Invalid email format").with_action("Use the form local@domain"),
        );
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Invalid email format");

        let rendered = err.to_app_error();
        assert_eq!(rendered.status_code(), 400);
        assert_eq!(rendered.action(), Some("Use the form local@domain"));
    }

    #[test]
    fn test_non_input_app_error_is_internal() {
        let err = AuthError::from(AppError::internal("Password hashing failed: cost"));
        assert!(matches!(err, AuthError::Internal(_)));
        assert_eq!(err.to_app_error().message(), "Internal server error");
    }
}

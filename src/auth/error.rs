// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::auth::models::Role;
use crate::error::ErrorResponse;

/// Authentication and authorization error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    // Authentication errors
    #[error("Missing or invalid Authorization header")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token has expired")]
    ExpiredToken,
    /// Token verified but its subject no longer resolves to an account
    #[error("Token subject {0} does not exist")]
    UnknownUser(i64),
    /// Login with an unregistered national identifier
    #[error("User not found")]
    UserNotFound,
    /// Login with a wrong password
    #[error("Incorrect password")]
    InvalidCredentials,

    // Authorization errors
    /// Authenticated role is outside the route's allow-list
    #[error("Role '{actual}' is not allowed here")]
    InsufficientPermissions {
        allowed: &'static [Role],
        actual: Role,
    },
    /// Role check ran on a route without identity extraction
    #[error("Authorization context missing")]
    MissingAuthContext,

    // Server-side failures
    #[error("A user with CPF '{0}' already exists")]
    DuplicateCpf(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Password hashing error: {0}")]
    PasswordHashError(String),
    #[error("Token generation error: {0}")]
    TokenGenerationError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(self.error_code(), self.error_message());

        match &self {
            AuthError::UserNotFound | AuthError::InvalidCredentials => {
                // distinct in logs, identical on the wire
                warn!("Login rejected: {}", self);
            }
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::UnknownUser(_) => warn!("Authentication failed: {}", self),
            AuthError::InsufficientPermissions { allowed, actual } => {
                warn!(
                    "Authorization failed: allowed roles {:?}, user has role '{}'",
                    allowed, actual
                );
            }
            AuthError::MissingAuthContext
            | AuthError::DatabaseError(_)
            | AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_) => error!("Auth internal error: {}", self),
            AuthError::DuplicateCpf(_) => {}
        }

        (status, Json(body)).into_response()
    }
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::UnknownUser(_)
            | AuthError::UserNotFound
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            AuthError::MissingAuthContext
            | AuthError::DuplicateCpf(_)
            | AuthError::DatabaseError(_)
            | AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AuthError::UserNotFound | AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::UnknownUser(_) => "UNAUTHENTICATED",
            AuthError::InsufficientPermissions { .. } => "FORBIDDEN",
            AuthError::DuplicateCpf(_) | AuthError::DatabaseError(_) => "PERSISTENCE_ERROR",
            AuthError::MissingAuthContext
            | AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_) => "INTERNAL_ERROR",
        }
    }

    /// Get a descriptive error message for this error
    /// This message is safe to send to clients (no sensitive data)
    pub fn error_message(&self) -> String {
        match self {
            AuthError::UserNotFound | AuthError::InvalidCredentials => {
                "Invalid CPF or password".to_string()
            }
            // an unresolvable subject looks like any other bad token
            AuthError::UnknownUser(_) => "Invalid token".to_string(),
            AuthError::InsufficientPermissions { .. } => "Access forbidden".to_string(),
            AuthError::DuplicateCpf(_) => self.to_string(),
            AuthError::MissingAuthContext
            | AuthError::DatabaseError(_)
            | AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_) => "Internal server error".to_string(),
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::ExpiredToken => {
                self.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failures_share_external_message() {
        assert_eq!(
            AuthError::UserNotFound.error_message(),
            AuthError::InvalidCredentials.error_message()
        );
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        // still distinguishable internally
        assert_ne!(
            AuthError::UserNotFound.to_string(),
            AuthError::InvalidCredentials.to_string()
        );
    }

    #[test]
    fn test_gate_status_codes() {
        assert_eq!(AuthError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::UnknownUser(3).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::InsufficientPermissions {
                allowed: &[Role::Admin],
                actual: Role::Doctor
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::MissingAuthContext.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AuthError::TokenGenerationError("bad key material".to_string());
        assert_eq!(err.error_message(), "Internal server error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

//! Platform Error Types

use thiserror::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response, Json},
};

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("{entity_type} not found")]
    NotFound { entity_type: String, id: String },

    #[error("Duplicate {entity_type}: {field} already in use")]
    Duplicate { entity_type: String, field: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("Password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("Selected time slot is not available")]
    SlotUnavailable,

    #[error("Application deadline has passed")]
    DeadlineExpired,

    #[error("Already applied to this internship")]
    DuplicateApplication,

    #[error("Advocate is not verified")]
    UnverifiedAdvocate,

    #[error("Database error: {0}")]
    Database(mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlatformError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(entity_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            field: field.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            // Uniqueness conflicts surface as 400, matching the original API
            Self::Duplicate { .. }
            | Self::Validation { .. }
            | Self::WeakPassword { .. }
            | Self::SlotUnavailable
            | Self::DeadlineExpired
            | Self::DuplicateApplication
            | Self::UnverifiedAdvocate => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. }
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

/// Uniform error envelope: `{success: false, message}`
#[derive(Debug, serde::Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal detail stays server-side
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Unhandled server error");
            "Server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody { success: false, message };
        (status, Json(body)).into_response()
    }
}

impl From<mongodb::error::Error> for PlatformError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            Self::Duplicate {
                entity_type: "Entity".to_string(),
                field: "unique field".to_string(),
            }
        } else {
            Self::Database(err)
        }
    }
}

/// MongoDB duplicate-key write errors carry server code 11000.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref we)) if we.code == 11000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PlatformError::not_found("Advocate", "X1").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PlatformError::duplicate("User", "email").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(PlatformError::SlotUnavailable.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(PlatformError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            PlatformError::forbidden("nope").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            PlatformError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_messages() {
        let err = PlatformError::not_found("Internship", "0ABC");
        assert_eq!(err.to_string(), "Internship not found");

        let err = PlatformError::WeakPassword { min_length: 6 };
        assert_eq!(err.to_string(), "Password must be at least 6 characters");

        assert_eq!(
            PlatformError::DeadlineExpired.to_string(),
            "Application deadline has passed"
        );
    }
}

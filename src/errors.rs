// src/errors.rs
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::email::MailError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    #[error("{0}")]
    ValidationError(String),

    #[error("No account exists with this email")]
    AccountNotFound,

    #[error("Invalid or already used code")]
    InvalidCode,

    #[error("The code has expired. Request a new one.")]
    CodeExpired,

    #[error("Invalid or expired session")]
    SessionNotFound,

    #[error("This session has already been used")]
    SessionUsed,

    #[error("The email does not match the session")]
    SessionEmailMismatch,

    #[error("The session has expired. Request a new code.")]
    SessionExpired,

    #[error("Email delivery is not configured. Please contact support.")]
    MailNotConfigured,

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error("Push delivery error: {0}")]
    PushError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MongoDB(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AccountNotFound => StatusCode::NOT_FOUND,
            AppError::InvalidCode => StatusCode::BAD_REQUEST,
            AppError::CodeExpired => StatusCode::GONE,
            AppError::SessionNotFound => StatusCode::NOT_FOUND,
            AppError::SessionUsed => StatusCode::CONFLICT,
            AppError::SessionEmailMismatch => StatusCode::BAD_REQUEST,
            AppError::SessionExpired => StatusCode::GONE,
            AppError::MailNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Mail(MailError::InvalidAddress(_)) => StatusCode::BAD_REQUEST,
            AppError::Mail(_) => StatusCode::BAD_GATEWAY,
            AppError::PushError(_) => StatusCode::BAD_GATEWAY,
            AppError::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::MongoDB(_) => "database_error",
            AppError::ValidationError(_) => "validation_error",
            AppError::AccountNotFound => "account_not_found",
            AppError::InvalidCode => "invalid_code",
            AppError::CodeExpired => "code_expired",
            AppError::SessionNotFound => "session_not_found",
            AppError::SessionUsed => "session_used",
            AppError::SessionEmailMismatch => "session_email_mismatch",
            AppError::SessionExpired => "session_expired",
            AppError::MailNotConfigured => "mail_not_configured",
            AppError::Mail(_) => "mail_error",
            AppError::PushError(_) => "push_error",
            AppError::ConfigurationError(_) => "configuration_error",
            AppError::InternalServerError(_) => "internal_error",
        }
    }

    /// Message safe to hand back to the client. Storage and internal
    /// failures are reported generically; the detail goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::MongoDB(_) => "Database error".to_string(),
            AppError::ConfigurationError(_) | AppError::InternalServerError(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("❌ {}", self);
        } else {
            tracing::warn!("⚠️ {}", self);
        }

        let body = Json(json!({
            "error": self.error_code(),
            "message": self.public_message(),
            "success": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::InternalServerError(format!("Password hashing failed: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| "Invalid request".to_string());
        AppError::ValidationError(message)
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::ConfigurationError(msg.into())
    }

    pub fn internal_server_error(msg: impl Into<String>) -> Self {
        AppError::InternalServerError(msg.into())
    }

    pub fn push(msg: impl Into<String>) -> Self {
        AppError::PushError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_errors_map_to_distinct_statuses() {
        assert_eq!(AppError::InvalidCode.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::CodeExpired.status_code(), StatusCode::GONE);
        assert_eq!(AppError::SessionUsed.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::AccountNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::MailNotConfigured.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = AppError::internal_server_error("connection string leaked");
        assert_eq!(err.public_message(), "Internal server error");
        assert!(err.to_string().contains("connection string leaked"));
    }

    #[test]
    fn mail_timeout_keeps_its_message() {
        let err = AppError::from(MailError::Timeout);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.public_message().contains("SMTP"));
    }
}

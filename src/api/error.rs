//! API error types with structured JSON responses.
//!
//! Every failure leaves the server as `{"error": {"code", "message"}}`.
//! Messages are the Portuguese texts the terminals show verbatim; codes
//! are stable identifiers for the client to branch on.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::db::DatabaseError;
use crate::flow::FlowError;
use crate::lean::LeanError;
use crate::models::Patient;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    /// Only on version conflicts: the record as currently stored, so the
    /// terminal can reload it and re-apply the edit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<Box<Patient>>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Sessão inválida ou expirada. Faça login novamente.")]
    Unauthorized,
    #[error("É necessário alterar a senha antes de continuar.")]
    PasswordChangeRequired,
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0}")]
    AccountBlocked(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Limite de requisições excedido")]
    RateLimited { retry_after: u64 },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{message}")]
    VersionConflict {
        message: String,
        current: Box<Patient>,
    },
    #[error("{0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                self.to_string(),
            ),
            ApiError::PasswordChangeRequired => (
                StatusCode::UNAUTHORIZED,
                "PASSWORD_CHANGE_REQUIRED",
                self.to_string(),
            ),
            ApiError::InvalidCredentials(message) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                message.clone(),
            ),
            ApiError::AccountBlocked(message) => {
                (StatusCode::FORBIDDEN, "ACCOUNT_BLOCKED", message.clone())
            }
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, "FORBIDDEN", message.clone()),
            ApiError::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("Limite de requisições excedido. Aguarde {retry_after}s."),
            ),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "NOT_FOUND", message.clone()),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "CONFLICT", message.clone()),
            ApiError::VersionConflict { message, .. } => {
                (StatusCode::CONFLICT, "VERSION_CONFLICT", message.clone())
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message.clone())
            }
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Erro interno do servidor. Tente novamente.".to_string(),
                )
            }
        };

        let current = match &self {
            ApiError::VersionConflict { current, .. } => Some(current.clone()),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                current,
            },
        };

        let mut response = (status, Json(body)).into_response();
        // Retry-After header for rate limited responses
        if let ApiError::RateLimited { retry_after } = &self {
            if let Ok(val) = axum::http::HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("Retry-After", val);
            }
        }
        response
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::UnknownUser => ApiError::NotFound(message),
            AuthError::WrongPassword { .. } => ApiError::InvalidCredentials(message),
            AuthError::Blocked | AuthError::JustBlocked => ApiError::AccountBlocked(message),
            AuthError::PasswordNotNumeric
            | AuthError::PasswordTooLong
            | AuthError::PasswordIsDefault
            | AuthError::LoginNotNumeric => ApiError::BadRequest(message),
            AuthError::DuplicateLogin => ApiError::Conflict(message),
            AuthError::Forbidden => ApiError::Forbidden(message),
            AuthError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        let message = err.to_string();
        match err {
            FlowError::PatientNotFound => ApiError::NotFound(message),
            FlowError::StaleVersion { current } => ApiError::VersionConflict { message, current },
            FlowError::MissingDestination => ApiError::BadRequest(message),
            FlowError::SocialWorkPendency { .. } => ApiError::Conflict(message),
            FlowError::Forbidden => ApiError::Forbidden(message),
            FlowError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<LeanError> for ApiError {
    fn from(err: LeanError) -> Self {
        let message = err.to_string();
        match err {
            LeanError::RecordNotFound => ApiError::NotFound(message),
            LeanError::Forbidden => ApiError::Forbidden(message),
            LeanError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

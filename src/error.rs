//! Domain error types for the blog server.
//!
//! Uses thiserror for ergonomic error handling. The `Display` text of each
//! variant is the message shown to site visitors in the response envelope.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::models::Envelope;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body is not a JSON object
    #[error("请求体格式错误")]
    MalformedBody,

    /// Body has no `action` field
    #[error("缺少action参数")]
    MissingAction,

    /// `action` names no operation of this endpoint
    #[error("未知操作类型")]
    UnknownAction,

    /// Request body exceeds the configured limit
    #[error("文件过大")]
    PayloadTooLarge,

    /// Admin credential missing or wrong
    #[error("管理员密码错误")]
    BadCredential,

    /// Action fields have the wrong shape; carries the decoder message
    #[error("请求参数错误")]
    InvalidParams(String),

    /// Invalid input data
    #[error("{0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with the current state of the resource
    #[error("{0}")]
    Conflict(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Storage (S3) operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Backend failure wrapped with the operation that hit it
    #[error("{message}")]
    Operation {
        message: &'static str,
        detail: String,
    },
}

impl AppError {
    /// Original backend message attached to the envelope, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AppError::Operation { detail, .. } | AppError::InvalidParams(detail) => Some(detail),
            _ => None,
        }
    }

    /// Build the failure envelope for this error.
    pub fn to_envelope(&self) -> Envelope<()> {
        match self {
            // Unwrapped backend errors should not leak internals to visitors.
            AppError::Database(_) => Envelope::failure("服务端错误", None),
            AppError::Storage(_) => Envelope::failure("存储服务错误", None),
            _ => Envelope::failure(self.to_string(), self.detail().map(str::to_string)),
        }
    }
}

impl ResponseError for AppError {
    // Errors travel inside the envelope; the transport always succeeds.
    fn status_code(&self) -> StatusCode {
        StatusCode::OK
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Database(err) | AppError::Storage(err) = self {
            tracing::error!("Unhandled backend error: {}", err);
        }
        HttpResponse::Ok().json(self.to_envelope())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Attach the failing operation's message to backend errors.
///
/// Validation, credential, not-found and conflict errors pass through
/// untouched; database and storage errors are logged and rewritten to
/// `AppError::Operation` so the envelope carries both messages.
pub trait OperationContext<T> {
    fn context(self, message: &'static str) -> AppResult<T>;
}

impl<T> OperationContext<T> for AppResult<T> {
    fn context(self, message: &'static str) -> AppResult<T> {
        self.map_err(|err| match err {
            AppError::Database(detail) | AppError::Storage(detail) => {
                tracing::error!("{}: {}", message, detail);
                AppError::Operation { message, detail }
            }
            other => other,
        })
    }
}

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidParams(err.to_string())
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("ID格式错误: {}", err))
    }
}

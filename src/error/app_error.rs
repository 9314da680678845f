use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub code: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        issues: Vec<ValidationIssue>,
    },

    #[error("Product not available: {0}")]
    ProductNotAvailable(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    InternalError(#[source] anyhow::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Service unavailable: {service}")]
    ServiceUnavailable { service: String, message: String },
}

pub type AppResult<T> = Result<T, AppError>;

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (_, code, label) = self.classify();
        let mut payload = serde_json::json!({
            "error": label,
            "message": self.public_message(),
            "code": code,
        });

        if let AppError::ValidationError { issues, .. } = self {
            if !issues.is_empty() {
                if let Ok(details) = serde_json::to_value(issues) {
                    payload["details"] = details;
                }
            }
        }

        HttpResponse::build(self.status_code()).json(payload)
    }

    fn status_code(&self) -> StatusCode {
        self.classify().0
    }
}

impl AppError {
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            issues: Vec::new(),
        }
    }

    /// Uniform answer for "no such conversation" and "not your conversation".
    pub fn conversation_not_found() -> Self {
        Self::NotFound("conversation not found".to_string())
    }

    pub fn error_code(&self) -> &'static str {
        self.classify().1
    }

    /// HTTP status, stable machine code and human label for each variant.
    fn classify(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", "Not found"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Unauthorized"),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", "Token expired"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", "Invalid token"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN", "Forbidden"),
            AppError::ValidationError { .. } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Validation error",
            ),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", "Bad request"),
            AppError::ProductNotAvailable(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PRODUCT_NOT_AVAILABLE",
                "Product not available",
            ),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", "Conflict"),
            AppError::ServiceUnavailable { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Service unavailable",
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Internal server error",
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error",
            ),
        }
    }

    /// Text safe to show callers. Storage and internal failures stay opaque.
    pub(crate) fn public_message(&self) -> String {
        match self {
            AppError::NotFound(message)
            | AppError::Forbidden(message)
            | AppError::ProductNotAvailable(message)
            | AppError::Conflict(message)
            | AppError::BadRequest(message)
            | AppError::ValidationError { message, .. }
            | AppError::ServiceUnavailable { message, .. } => message.clone(),
            other => other.classify().2.to_string(),
        }
    }
}

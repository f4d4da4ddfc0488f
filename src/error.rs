use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller's role or ownership does not allow the action.
    #[error("Forbidden: {message}")]
    Forbidden { message: String, redirect_to: String },

    /// A state guard refused the transition (full event, duplicate
    /// application, unapproved certificate, ...).
    #[error("Rejected: {message}")]
    Rejected { message: String, redirect_to: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl Error {
    pub fn forbidden(message: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        Error::Forbidden {
            message: message.into(),
            redirect_to: redirect_to.into(),
        }
    }

    pub fn rejected(message: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        Error::Rejected {
            message: message.into(),
            redirect_to: redirect_to.into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Error::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": msg, "redirect_to": "/accounts/login/" }),
            ),
            Error::Forbidden {
                message,
                redirect_to,
            } => (
                StatusCode::FORBIDDEN,
                json!({ "error": message, "redirect_to": redirect_to }),
            ),
            Error::Rejected {
                message,
                redirect_to,
            } => (
                StatusCode::CONFLICT,
                json!({ "error": message, "redirect_to": redirect_to }),
            ),
            Error::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            Error::Validation(err) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Please correct the errors below.", "fields": err.field_errors() }),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Multipart(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Token(_) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid or expired session", "redirect_to": "/accounts/login/" }),
            ),
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An unexpected error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => Error::Conflict(
                db.constraint()
                    .map(|c| format!("Duplicate value violates {}", c))
                    .unwrap_or_else(|| "Duplicate value".to_string()),
            ),
            other => Error::Database(other),
        }
    }
}

impl From<crate::models::UnknownVariant> for Error {
    fn from(err: crate::models::UnknownVariant) -> Self {
        Error::BadRequest(err.to_string())
    }
}

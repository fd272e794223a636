// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use uuid::Uuid;

use crate::quiz::attempt::AttemptError;

/// Global Application Error Enum.
/// Every failure is scoped to the request that produced it.
#[derive(Debug)]
pub enum AppError {
    // 400 Bad Request: bad user input, shown inline.
    Validation(String),

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden: signed in, but acting on someone else's attempt.
    Forbidden(String),

    // 404 Not Found: referenced entity absent.
    NotFound(String),

    // 409 Conflict: operation not valid in the attempt's current state.
    Conflict(String),

    // 409 Conflict: submitting with unanswered questions without confirming.
    ConfirmationRequired { answered: usize, total: usize },

    // 500: backend read/write failure, retry is up to the user.
    Persistence(String),

    // 500: the quiz row was written but its questions were not.
    PartialPersistence { quiz_id: Uuid, message: String },

    // 500 Internal Server Error
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "validation error: {}", msg),
            AppError::AuthError(msg) => write!(f, "auth error: {}", msg),
            AppError::Forbidden(msg) => write!(f, "forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "conflict: {}", msg),
            AppError::ConfirmationRequired { answered, total } => write!(
                f,
                "confirmation required: {} of {} questions answered",
                answered, total
            ),
            AppError::Persistence(msg) => write!(f, "persistence error: {}", msg),
            AppError::PartialPersistence { quiz_id, message } => write!(
                f,
                "partial persistence for quiz {}: {}",
                quiz_id, message
            ),
            AppError::InternalServerError(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::ConfirmationRequired { answered, total } => (
                StatusCode::CONFLICT,
                json!({
                    "error": format!(
                        "You have only answered {} out of {} questions. Submit anyway?",
                        answered, total
                    ),
                    "requires_confirmation": true,
                    "answered": answered,
                    "total": total,
                }),
            ),
            AppError::Persistence(msg) => {
                tracing::error!("Persistence error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Failed to reach the record store. Please try again." }),
                )
            }
            AppError::PartialPersistence { quiz_id, message } => {
                tracing::error!(%quiz_id, "Quiz saved without its questions: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "The quiz was created but its questions could not be saved.",
                        "partial": true,
                        "quiz_id": quiz_id,
                    }),
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Allows using `?` on database queries.
/// `RowNotFound` only comes out of `fetch_one`, so it means the entity is absent.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            other => AppError::Persistence(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errs: validator::ValidationErrors) -> Self {
        AppError::Validation(errs.to_string())
    }
}

impl From<AttemptError> for AppError {
    fn from(err: AttemptError) -> Self {
        match err {
            AttemptError::ConfirmationRequired { answered, total } => {
                AppError::ConfirmationRequired { answered, total }
            }
            AttemptError::NotOwner => AppError::Forbidden(err.to_string()),
            other => AppError::Conflict(other.to_string()),
        }
    }
}

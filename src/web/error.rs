//! API error surface.
//!
//! Every failure terminates its own request and is reported verbatim:
//! validation problems as field-keyed JSON, everything else as a single
//! detail message. Nothing here retries.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Form-level validation failures, keyed by field.
    #[error("validation failed")]
    Validation(ValidationErrors),
    /// A hand-raised failure on a single field.
    #[error("{message}")]
    Field {
        field: &'static str,
        message: String,
    },
    /// Duplicate slug/username, or a second rating for the same blog.
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Authentication required.")]
    Unauthorized,
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Field {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{} not found.", what))
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Translates a storage-level unique violation into a Conflict so racing
/// writers get a deterministic rejection instead of a 500. Anything else
/// stays a database error. `sql_err` classifies by SQLSTATE; the textual
/// check only catches violations re-wrapped without the driver error.
pub fn map_unique_violation(err: DbErr, message: &str) -> ApiError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return ApiError::Conflict(message.to_owned());
    }
    let text = err.to_string();
    if text.contains("duplicate key") || text.to_lowercase().contains("unique constraint") {
        ApiError::Conflict(message.to_owned())
    } else {
        ApiError::Database(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Field { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::Validation(errors) => json!({ "errors": errors }),
            Self::Field { field, message } => {
                let mut errors = serde_json::Map::new();
                errors.insert((*field).to_owned(), json!([message]));
                json!({ "errors": errors })
            }
            Self::Database(err) => {
                log::error!("Database error surfaced to client: {}", err);
                json!({ "detail": "Internal server error." })
            }
            Self::Internal(msg) => {
                log::error!("Internal error surfaced to client: {}", msg);
                json!({ "detail": "Internal server error." })
            }
            other => json!({ "detail": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

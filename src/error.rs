//! Domain error types for the gist sync server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

use crate::models::ReconcileReport;
use crate::services::crm::CrmError;
use crate::services::gists::GistError;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// CRM or gist API call failed
    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    /// No CRM person matches the username
    #[error("User '{0}' not found")]
    UserNotFound(String),

    /// The person search returned more than one match
    #[error("User '{0}' is ambiguous: {1} people share that name")]
    AmbiguousUser(String, usize),

    /// The username already has a CRM person
    #[error("User '{0}' is already tracked")]
    AlreadyTracked(String),

    /// Missing or malformed query parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Some units of a reconciliation run failed; the rest were applied
    #[error("Sync partially failed: {} created, {} failed", .0.created, .0.failures.len())]
    PartialFailure(ReconcileReport),

    /// Digest template failed to render
    #[error("Render error: {0}")]
    Render(String),
}

impl AppError {
    /// Stable machine-readable code for the error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Upstream(_) => "UPSTREAM_UNAVAILABLE",
            AppError::UserNotFound(_) => "USER_NOT_FOUND",
            AppError::AmbiguousUser(..) => "AMBIGUOUS_USER",
            AppError::AlreadyTracked(_) => "ALREADY_TRACKED",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::PartialFailure(_) => "PARTIAL_FAILURE",
            AppError::Render(_) => "RENDER_ERROR",
        }
    }

    /// Plain-text response for the HTML routes.
    pub fn text_response(&self) -> HttpResponse {
        self.log();
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(self.to_string())
    }

    fn log(&self) {
        match self {
            AppError::Upstream(err_str) => tracing::error!("Upstream error: {}", err_str),
            AppError::Render(err_str) => tracing::error!("Render error: {}", err_str),
            AppError::PartialFailure(report) => {
                tracing::warn!(
                    created = report.created,
                    failed = report.failures.len(),
                    "Sync completed with failures"
                )
            }
            _ => {}
        }
    }
}

// Every domain failure is a 500 for compatibility with existing callers; the
// `error` code in the body tells them apart. Only malformed requests get a 400.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();

        let report = match self {
            AppError::PartialFailure(report) => Some(report.clone()),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            report,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Present for partial sync failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReconcileReport>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<CrmError> for AppError {
    fn from(err: CrmError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<GistError> for AppError {
    fn from(err: GistError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        AppError::Render(err.to_string())
    }
}

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use report_pipeline::{ErrorKind, PipelineError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Shown to clients instead of internal failure details.
const GENERIC_FAILURE: &str = "An internal server error occurred. Please try again later.";

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },

    // --- Pipeline ---
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Http { status, .. } => *status,
            AppError::Pipeline(e) => match (e, e.kind()) {
                (PipelineError::FileTooLarge { .. }, _) => StatusCode::PAYLOAD_TOO_LARGE,
                (PipelineError::ParseFailure { .. }, _) => StatusCode::UNPROCESSABLE_ENTITY,
                (_, ErrorKind::Validation) => StatusCode::BAD_REQUEST,
                (_, ErrorKind::NotFound) => StatusCode::NOT_FOUND,
                (_, ErrorKind::Internal) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Bind(_) | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
            AppError::Pipeline(e) => match e {
                PipelineError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
                PipelineError::FileTooLarge { .. } => "FILE_TOO_LARGE",
                PipelineError::ParseFailure { .. } => "PARSE_FAILURE",
                PipelineError::InvalidSubmission(_) => "INVALID_SUBMISSION",
                PipelineError::ReportNotFound(_) => "NOT_FOUND",
                _ => "INTERNAL_ERROR",
            },
        }
    }

    /// Client-facing text. Internal causes never leave the process.
    fn public_message(&self) -> String {
        match self {
            AppError::Pipeline(e) if e.kind() == ErrorKind::Internal => GENERIC_FAILURE.into(),
            AppError::Bind(_) | AppError::Server(_) => GENERIC_FAILURE.into(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = ?self, code = self.error_code(), "request failed");
        } else {
            warn!(error = %self, code = self.error_code(), "request rejected");
        }

        let body = ErrorBody {
            error: self.error_code(),
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<MultipartRejection> for AppError {
    fn from(err: MultipartRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

/// Keeps the status chosen by axum (413 when the body limit is hit).
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        let status = err.status();
        let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "FILE_TOO_LARGE"
        } else {
            "BAD_REQUEST"
        };
        AppError::Http {
            status,
            code,
            message: err.body_text(),
        }
    }
}

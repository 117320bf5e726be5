//! Typed error for the report pipeline.

use std::{path::PathBuf, time::Duration};

use ai_llm_service::AiLlmError;
use thiserror::Error;

use crate::prompt::DATA_PLACEHOLDER;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Extension is not one of the accepted document types.
    #[error("unsupported file type: '{0}'")]
    UnsupportedFormat(String),

    /// Document exceeds the configured size ceiling.
    #[error("file is too large: {size} bytes exceeds the limit of {limit} bytes")]
    FileTooLarge { size: usize, limit: usize },

    /// Format-specific decode error. Parsing is all-or-nothing.
    #[error("failed to parse {format} document: {reason}")]
    ParseFailure { format: &'static str, reason: String },

    /// Neither or both of document and text were supplied.
    #[error("invalid submission: {0}")]
    InvalidSubmission(&'static str),

    #[error("prompt template does not contain the data placeholder {DATA_PLACEHOLDER}")]
    PlaceholderMissing,

    #[error(
        "prompt template contains the data placeholder {occurrences} times, expected exactly once"
    )]
    PlaceholderDuplicated { occurrences: usize },

    #[error("prompt template {} could not be read", path.display())]
    TemplateUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport or provider failure while calling the model.
    #[error("model invocation failed: {0}")]
    ModelInvocationFailure(#[source] AiLlmError),

    #[error("model call timed out after {0:?}")]
    ModelTimeout(Duration),

    /// Model answered with an empty or undecodable body.
    #[error("model returned an invalid response: {0}")]
    ModelResponseInvalid(String),

    #[error("report not found: {0}")]
    ReportNotFound(String),

    /// JSON serialization of parsed data (should not happen for string-only data).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification used at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Client-correctable; the message is safe to show.
    Validation,
    NotFound,
    /// Logged in full, surfaced as a generic failure.
    Internal,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::UnsupportedFormat(_)
            | PipelineError::FileTooLarge { .. }
            | PipelineError::ParseFailure { .. }
            | PipelineError::InvalidSubmission(_) => ErrorKind::Validation,
            PipelineError::ReportNotFound(_) => ErrorKind::NotFound,
            PipelineError::PlaceholderMissing
            | PipelineError::PlaceholderDuplicated { .. }
            | PipelineError::TemplateUnavailable { .. }
            | PipelineError::ModelInvocationFailure(_)
            | PipelineError::ModelTimeout(_)
            | PipelineError::ModelResponseInvalid(_)
            | PipelineError::Json(_)
            | PipelineError::Internal(_) => ErrorKind::Internal,
        }
    }
}

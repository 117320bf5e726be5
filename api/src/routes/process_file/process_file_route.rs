//! POST /process-file/: turns an uploaded document or raw text into an HTML report.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use report_pipeline::{PipelineError, Submission, UploadedDocument};
use tracing::{info, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::process_file::process_file_response::ProcessFileResponse,
};

const FILE_FIELD: &str = "file";
const TEXT_FIELD: &str = "text_input";

/// Handler: POST /process-file/
///
/// Multipart parts: `file` (xlsx, xls or pdf) or `text_input`. Exactly one
/// must be non-empty and `file` may appear once. Unknown parts are ignored.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/process-file/ -F 'file=@sales.xlsx'
/// curl -X POST http://127.0.0.1:8000/process-file/ -F 'text_input=Q3 revenue grew 12%'
/// ```
#[instrument(skip_all)]
pub async fn process_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ProcessFileResponse>> {
    let submission = read_submission(multipart?).await?;
    info!(kind = submission.kind(), "submission received");

    let report = state.pipeline.run(submission).await?;

    Ok(Json(ProcessFileResponse {
        html: report.html.to_string(),
        report_id: report.id.to_string(),
    }))
}

async fn read_submission(mut multipart: Multipart) -> AppResult<Submission> {
    let mut document = None;
    let mut text = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;
                // browsers send an empty, nameless part when no file was picked
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                if document.is_some() {
                    return Err(
                        PipelineError::InvalidSubmission("only one file may be uploaded").into(),
                    );
                }
                info!(%filename, size = bytes.len(), "file part received");
                document = Some(UploadedDocument::new(filename, bytes.to_vec()));
            }
            Some(TEXT_FIELD) => text = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(Submission::from_parts(document, text)?)
}

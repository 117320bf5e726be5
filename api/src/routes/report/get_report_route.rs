//! GET /report/{report_id}: returns a previously generated report.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Html,
};

use crate::{core::app_state::AppState, error_handler::AppResult};

/// Handler: GET /report/{report_id}
///
/// Responds with the stored HTML, or 404 for unknown or malformed ids.
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<String>,
) -> AppResult<Html<String>> {
    let html = state.pipeline.report(&report_id).await?;
    Ok(Html(html.to_string()))
}

use std::sync::Arc;

use report_pipeline::ReportPipeline;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Fully wired pipeline; owns the report registry.
    pub pipeline: Arc<ReportPipeline>,
}

impl AppState {
    pub fn new(pipeline: ReportPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Largest document accepted by the pipeline, in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.pipeline.config().max_upload_bytes
    }
}

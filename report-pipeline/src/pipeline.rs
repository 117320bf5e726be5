//! End-to-end orchestration: validate, parse, compose, invoke, sanitize, register.

use std::sync::Arc;

use ai_llm_service::AiLlmError;
use tracing::{debug, info, instrument, warn};

use crate::{
    cfg::PipelineConfig,
    document::{ParsedDocument, Submission, UploadedDocument},
    error::{PipelineError, Result},
    format::FormatDispatcher,
    llm::ModelClient,
    prompt::PromptComposer,
    registry::{GeneratedReport, ReportId, ReportRegistry},
    sanitize::sanitize_html_response,
};

const OUTPUT_PREVIEW_CHARS: usize = 200;

/// Turns one submission into one stored HTML report.
///
/// Stateless between requests apart from the shared registry; concurrent
/// `run` calls do not interact.
pub struct ReportPipeline {
    cfg: PipelineConfig,
    dispatcher: FormatDispatcher,
    composer: PromptComposer,
    model: Arc<dyn ModelClient>,
    registry: Arc<ReportRegistry>,
}

impl ReportPipeline {
    pub fn new(
        cfg: PipelineConfig,
        model: Arc<dyn ModelClient>,
        registry: Arc<ReportRegistry>,
    ) -> Self {
        let composer = PromptComposer::new(cfg.template_path.clone());
        Self {
            cfg,
            dispatcher: FormatDispatcher::default(),
            composer,
            model,
            registry,
        }
    }

    /// Replaces the default parsers.
    pub fn with_dispatcher(mut self, dispatcher: FormatDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn registry(&self) -> &Arc<ReportRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Runs the full pipeline. A report is registered only if every stage
    /// succeeds; any failure leaves the registry untouched.
    #[instrument(skip_all, fields(kind = submission.kind()))]
    pub async fn run(&self, submission: Submission) -> Result<GeneratedReport> {
        let parsed = self.prepare(submission).await?;
        let prompt = self.composer.compose(&parsed).await?;

        let raw = self.invoke_model(&prompt).await?;
        debug!(preview = %preview(&raw), "model output received");

        let html = sanitize_html_response(&raw);
        if html.trim().is_empty() {
            return Err(PipelineError::ModelResponseInvalid(
                "model returned no content".into(),
            ));
        }

        let id = self.registry.put(html.as_str()).await;
        info!(report_id = %id, html_len = html.len(), "report generated");
        Ok(GeneratedReport {
            id,
            html: html.into(),
        })
    }

    /// Validates the submission and produces its normalized representation.
    ///
    /// The size check and format resolution happen before any bytes are
    /// decoded; parsing itself runs on the blocking pool.
    pub async fn prepare(&self, submission: Submission) -> Result<ParsedDocument> {
        match submission {
            Submission::Text(text) => {
                info!(chars = text.chars().count(), "text submission accepted");
                Ok(ParsedDocument::text_input(text))
            }
            Submission::Document(doc) => self.parse_document(doc).await,
        }
    }

    async fn parse_document(&self, doc: UploadedDocument) -> Result<ParsedDocument> {
        let limit = self.cfg.max_upload_bytes;
        if doc.size() > limit {
            warn!(filename = %doc.filename(), size = doc.size(), limit, "document rejected: too large");
            return Err(PipelineError::FileTooLarge {
                size: doc.size(),
                limit,
            });
        }

        let parser = self.dispatcher.resolve(&doc)?;
        let format = parser.format_name();
        info!(filename = %doc.filename(), size = doc.size(), format, "parsing document");

        let bytes = doc.into_content();
        let parsed = tokio::task::spawn_blocking(move || parser.parse(&bytes))
            .await
            .map_err(|e| PipelineError::Internal(format!("parser task failed: {e}")))??;

        match &parsed {
            ParsedDocument::Workbook(sheets) => info!(
                format,
                sheets = sheets.len(),
                rows = sheets.iter().map(|s| s.rows.len()).sum::<usize>(),
                "document parsed"
            ),
            ParsedDocument::Pages(pages) => info!(format, pages = pages.len(), "document parsed"),
            ParsedDocument::Text(_) => info!(format, "document parsed"),
        }
        Ok(parsed)
    }

    async fn invoke_model(&self, prompt: &str) -> Result<String> {
        let timeout = self.cfg.model_timeout;
        info!(prompt_len = prompt.len(), ?timeout, "invoking model");

        match tokio::time::timeout(timeout, self.model.invoke(prompt)).await {
            Err(_) => Err(PipelineError::ModelTimeout(timeout)),
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) if e.is_invalid_response() => {
                Err(PipelineError::ModelResponseInvalid(e.to_string()))
            }
            Ok(Err(AiLlmError::Timeout(d))) => Err(PipelineError::ModelTimeout(d)),
            Ok(Err(e)) => Err(PipelineError::ModelInvocationFailure(e)),
        }
    }

    /// Looks up a stored report by its textual id.
    ///
    /// # Errors
    /// [`PipelineError::ReportNotFound`] for malformed or unknown ids.
    pub async fn report(&self, id: &str) -> Result<Arc<str>> {
        let not_found = || PipelineError::ReportNotFound(id.to_string());
        let parsed: ReportId = id.parse().map_err(|_| not_found())?;
        self.registry.get(&parsed).await.ok_or_else(not_found)
    }
}

fn preview(s: &str) -> String {
    s.chars().take(OUTPUT_PREVIEW_CHARS).collect()
}

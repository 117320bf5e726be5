//! Prompt composition: canonical JSON spliced into a template at a single placeholder.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    document::ParsedDocument,
    error::{PipelineError, Result},
};

/// The one literal the template must contain exactly once.
pub const DATA_PLACEHOLDER: &str = "[VERIFIED DATA IN JSON FORMAT]";

/// Number of characters of the prompt head/tail written to debug logs.
const LOG_PREVIEW_CHARS: usize = 200;

/// A template validated to contain [`DATA_PLACEHOLDER`] exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
    at: usize,
}

impl PromptTemplate {
    /// # Errors
    /// - [`PipelineError::PlaceholderMissing`] if the placeholder is absent
    /// - [`PipelineError::PlaceholderDuplicated`] if it occurs more than once
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let occurrences = text.matches(DATA_PLACEHOLDER).count();
        match (occurrences, text.find(DATA_PLACEHOLDER)) {
            (1, Some(at)) => Ok(Self { text, at }),
            (0, _) | (_, None) => Err(PipelineError::PlaceholderMissing),
            (n, _) => Err(PipelineError::PlaceholderDuplicated { occurrences: n }),
        }
    }

    /// Replaces the placeholder with the canonical JSON of `data`.
    /// Everything outside the placeholder span is kept byte for byte.
    ///
    /// # Errors
    /// [`PipelineError::Json`] if `data` cannot be serialized.
    pub fn compose<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = canonical_json(data)?;
        let (head, rest) = self.text.split_at(self.at);
        let tail = &rest[DATA_PLACEHOLDER.len()..];

        let mut out = String::with_capacity(head.len() + json.len() + tail.len());
        out.push_str(head);
        out.push_str(&json);
        out.push_str(tail);
        Ok(out)
    }
}

/// Pretty JSON (two-space indent) with non-ASCII kept verbatim.
///
/// Key order is the serializer's field/entry order, which for
/// [`ParsedDocument`] is source order, so equal input gives equal text.
pub fn canonical_json<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Loads the template resource and composes prompts from parsed documents.
///
/// The template is re-read on each call so it can be edited without a restart.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    template_path: PathBuf,
}

impl PromptComposer {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
        }
    }

    /// # Errors
    /// [`PipelineError::TemplateUnavailable`] if the file cannot be read, or a
    /// placeholder error from [`PromptTemplate::parse`].
    pub async fn load_template(&self) -> Result<PromptTemplate> {
        let text = tokio::fs::read_to_string(&self.template_path)
            .await
            .map_err(|source| PipelineError::TemplateUnavailable {
                path: self.template_path.clone(),
                source,
            })?;
        PromptTemplate::parse(text)
    }

    pub async fn compose(&self, data: &ParsedDocument) -> Result<String> {
        let template = self.load_template().await?;
        let prompt = template.compose(data)?;

        info!(prompt_len = prompt.len(), "data injected into prompt template");
        debug!(head = %preview_head(&prompt), "prompt head");
        debug!(tail = %preview_tail(&prompt), "prompt tail");
        Ok(prompt)
    }
}

fn preview_head(s: &str) -> String {
    s.chars().take(LOG_PREVIEW_CHARS).collect()
}

fn preview_tail(s: &str) -> String {
    let n = s.chars().count();
    s.chars().skip(n.saturating_sub(LOG_PREVIEW_CHARS)).collect()
}

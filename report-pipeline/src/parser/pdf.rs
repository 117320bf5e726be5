//! Page-by-page text extraction via `pdf-extract`.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{info, warn};

use super::DocumentParser;
use crate::{
    document::{Page, ParsedDocument},
    error::{PipelineError, Result},
    normalize::normalize_text,
};

const FORMAT: &str = "pdf";

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextParser;

impl DocumentParser for PdfTextParser {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn parse(&self, bytes: &[u8]) -> Result<ParsedDocument> {
        // pdf-extract can panic on malformed fonts/glyphs
        let extracted = catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }))
        .map_err(|_| {
            warn!("pdf extractor panicked");
            PipelineError::ParseFailure {
                format: FORMAT,
                reason: "extractor crashed on malformed content".to_string(),
            }
        })?
        .map_err(|e| PipelineError::ParseFailure {
            format: FORMAT,
            reason: e.to_string(),
        })?;

        let pages = pages_from_text(&extracted);
        info!(pages = pages.len(), "pdf parsed");
        Ok(ParsedDocument::Pages(pages))
    }
}

/// One normalized [`Page`] per extracted page, in document order.
fn pages_from_text(extracted: &[String]) -> Vec<Page> {
    extracted
        .iter()
        .enumerate()
        .map(|(i, text)| Page::new(i, normalize_text(text)))
        .collect()
}

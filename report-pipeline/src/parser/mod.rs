//! Per-format parsers. Each turns raw file bytes into a [`ParsedDocument`].

mod pdf;
mod spreadsheet;

pub use pdf::PdfTextParser;
pub use spreadsheet::SpreadsheetParser;

use crate::{document::ParsedDocument, error::Result};

/// Capability bound to one document format.
///
/// Parsers are pure and synchronous: the pipeline runs them on the blocking
/// pool, and the same bytes always produce the same output.
pub trait DocumentParser: Send + Sync {
    /// Short name used in logs and `ParseFailure` messages.
    fn format_name(&self) -> &'static str;

    /// # Errors
    /// [`PipelineError::ParseFailure`](crate::PipelineError::ParseFailure) on
    /// unreadable content; no partial result is returned.
    fn parse(&self, bytes: &[u8]) -> Result<ParsedDocument>;
}

//! Extension-based routing of uploaded documents to their parser.

use std::sync::Arc;

use tracing::debug;

use crate::{
    document::UploadedDocument,
    error::{PipelineError, Result},
    parser::{DocumentParser, PdfTextParser, SpreadsheetParser},
};

/// Extensions handled by the spreadsheet parser.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Extension handled by the page-text parser.
pub const PDF_EXTENSION: &str = "pdf";

/// Format resolved once from the (lowercased) extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentFormat {
    Spreadsheet,
    Pdf,
    Unsupported(String),
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            DocumentFormat::Spreadsheet
        } else if ext == PDF_EXTENSION {
            DocumentFormat::Pdf
        } else {
            DocumentFormat::Unsupported(ext)
        }
    }
}

/// Binds each supported format to a parser.
///
/// Parsers are shared trait objects so tests can swap in recording fakes.
#[derive(Clone)]
pub struct FormatDispatcher {
    spreadsheet: Arc<dyn DocumentParser>,
    pdf: Arc<dyn DocumentParser>,
}

impl Default for FormatDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(SpreadsheetParser), Arc::new(PdfTextParser))
    }
}

impl FormatDispatcher {
    pub fn new(spreadsheet: Arc<dyn DocumentParser>, pdf: Arc<dyn DocumentParser>) -> Self {
        Self { spreadsheet, pdf }
    }

    /// Picks the parser for `doc` without touching its content.
    ///
    /// # Errors
    /// [`PipelineError::UnsupportedFormat`] carrying the offending extension.
    pub fn resolve(&self, doc: &UploadedDocument) -> Result<Arc<dyn DocumentParser>> {
        let parser = match DocumentFormat::from_extension(doc.extension()) {
            DocumentFormat::Spreadsheet => self.spreadsheet.clone(),
            DocumentFormat::Pdf => self.pdf.clone(),
            DocumentFormat::Unsupported(ext) => return Err(PipelineError::UnsupportedFormat(ext)),
        };
        debug!(
            filename = %doc.filename(),
            parser = parser.format_name(),
            "format resolved"
        );
        Ok(parser)
    }
}

//! Document-to-report pipeline.
//!
//! A submission (spreadsheet, PDF or raw text) is parsed into an ordered,
//! string-only structure, serialized to canonical JSON, spliced into a prompt
//! template and sent to a generative model. The returned HTML is sanitized and
//! kept in an in-memory [`ReportRegistry`] under a random [`ReportId`].
//!
//! Entry point: [`ReportPipeline::run`].

pub mod cfg;
pub mod document;
pub mod error;
pub mod format;
pub mod llm;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod registry;
pub mod sanitize;

pub use cfg::PipelineConfig;
pub use document::{ParsedDocument, Submission, UploadedDocument};
pub use error::{ErrorKind, PipelineError, Result};
pub use format::{DocumentFormat, FormatDispatcher};
pub use llm::ModelClient;
pub use normalize::normalize_text;
pub use parser::DocumentParser;
pub use pipeline::ReportPipeline;
pub use prompt::{DATA_PLACEHOLDER, PromptComposer, PromptTemplate};
pub use registry::{GeneratedReport, ReportId, ReportRegistry};
pub use sanitize::sanitize_html_response;

//! Submission inputs and the normalized structure handed to the prompt.
//!
//! [`ParsedDocument`] serializes to the JSON shape the prompt expects:
//! - workbook: `{ "<sheet>": [ { "<column>": "<text>", ... }, ... ], ... }`
//! - pages:    `{ "page_1": "<text>", ... }`
//! - text:     `{ "source": "text_input", "content": "<text>" }`
//!
//! Keys always come out in source order (sheet order, column order, page order).

use serde::{
    Serialize, Serializer,
    ser::{SerializeMap, SerializeStruct},
};

use crate::error::{PipelineError, Result};

/// `source` tag attached to raw text submissions.
pub const TEXT_INPUT_SOURCE: &str = "text_input";

/// A file received from the caller. Owned by the request that runs the pipeline.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    content: Vec<u8>,
    filename: String,
    extension: String,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let filename = filename.into();
        let extension = extension_of(&filename);
        Self {
            content: content.into(),
            filename,
            extension,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Lowercased text after the last `.`; empty when the name has no dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }
}

fn extension_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// What the caller handed in: exactly one of a document or raw text.
#[derive(Debug, Clone)]
pub enum Submission {
    Document(UploadedDocument),
    Text(String),
}

impl Submission {
    /// Builds a submission from the two optional inputs of the upload form.
    ///
    /// Empty text counts as absent.
    ///
    /// # Errors
    /// [`PipelineError::InvalidSubmission`] when neither or both are present.
    pub fn from_parts(document: Option<UploadedDocument>, text: Option<String>) -> Result<Self> {
        let text = text.filter(|t| !t.is_empty());
        match (document, text) {
            (Some(doc), None) => Ok(Submission::Document(doc)),
            (None, Some(text)) => Ok(Submission::Text(text)),
            (None, None) => Err(PipelineError::InvalidSubmission(
                "a file or text must be provided",
            )),
            (Some(_), Some(_)) => Err(PipelineError::InvalidSubmission(
                "provide either a file or text, not both",
            )),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Submission::Document(_) => "document",
            Submission::Text(_) => "text",
        }
    }
}

/// Normalized content of a submission. All leaf values are strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedDocument {
    Workbook(Vec<Sheet>),
    Pages(Vec<Page>),
    Text(TextInput),
}

impl ParsedDocument {
    pub fn text_input(content: impl Into<String>) -> Self {
        ParsedDocument::Text(TextInput {
            content: content.into(),
        })
    }
}

impl Serialize for ParsedDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ParsedDocument::Workbook(sheets) => {
                let mut map = serializer.serialize_map(Some(sheets.len()))?;
                for sheet in sheets {
                    map.serialize_entry(&sheet.name, &sheet.rows)?;
                }
                map.end()
            }
            ParsedDocument::Pages(pages) => {
                let mut map = serializer.serialize_map(Some(pages.len()))?;
                for page in pages {
                    map.serialize_entry(&page.label, &page.text)?;
                }
                map.end()
            }
            ParsedDocument::Text(text) => text.serialize(serializer),
        }
    }
}

/// One worksheet, rows in sheet order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

/// One data row: `(column, value)` pairs in column order. Blank cells are `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn new(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Normalized text of one page; `label` is `page_<1-based index>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub label: String,
    pub text: String,
}

impl Page {
    pub fn new(index: usize, text: String) -> Self {
        Self {
            label: format!("page_{}", index + 1),
            text,
        }
    }
}

/// Raw text submitted directly instead of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    pub content: String,
}

impl Serialize for TextInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("TextInput", 2)?;
        s.serialize_field("source", TEXT_INPUT_SOURCE)?;
        s.serialize_field("content", &self.content)?;
        s.end()
    }
}

//! crates/legal_review_core/src/domain.rs
//!
//! Defines the pure, core data structures for the client.
//! These structs are independent of any transport or serialization format.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::Path;
use uuid::Uuid;

/// MIME type accepted for PDF uploads.
pub const PDF_MIME: &str = "application/pdf";
/// MIME type accepted for Word (.docx) uploads.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// Largest upload the client will send, in bytes (50 MB).
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;
/// Longest question, in characters, accepted by the query entry point.
pub const MAX_QUESTION_CHARS: usize = 500;

/// A document as listed by the backend. `filename` is the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub filename: String,
    pub original_name: String,
    pub file_size: u64,
    pub upload_date: DateTime<Utc>,
    pub document_type: String,
    pub status: String,
}

impl DocumentRecord {
    pub fn is_ready(&self) -> bool {
        self.status.eq_ignore_ascii_case("ready")
    }
}

/// Metadata returned alongside a document's extracted text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentMetadata {
    pub file_size: Option<u64>,
    pub file_type: Option<String>,
    pub upload_date: Option<DateTime<Utc>>,
    pub word_count: usize,
}

/// The extracted text of a single document, split into pages.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentContent {
    pub filename: String,
    pub pages: Vec<String>,
    pub metadata: ContentMetadata,
}

impl DocumentContent {
    /// Builds content from pages, deriving the word count when the backend did not supply one.
    pub fn new(filename: String, pages: Vec<String>, metadata: Option<ContentMetadata>) -> Self {
        let mut metadata = metadata.unwrap_or_default();
        if metadata.word_count == 0 {
            metadata.word_count = pages.iter().map(|p| p.split_whitespace().count()).sum();
        }
        Self {
            filename,
            pages,
            metadata,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns the text of page `number`, counting from 1.
    pub fn page(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
            .map(String::as_str)
    }
}

/// A file selected for upload. The bytes are held in memory.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Creates an upload whose MIME type is inferred from the file extension.
    /// Unknown extensions get `application/octet-stream`, which validation rejects.
    pub fn from_name(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let name = name.into();
        let content_type = mime_for_name(&name).unwrap_or("application/octet-stream");
        Self::new(name, content_type, data)
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Maps a `.pdf` or `.docx` file name to its MIME type.
pub fn mime_for_name(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(PDF_MIME),
        "docx" => Some(DOCX_MIME),
        _ => None,
    }
}

/// The backend's acknowledgement of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub message: String,
    pub filename: String,
    pub file_size: Option<u64>,
    pub document_type: Option<String>,
}

/// The backend's answer to a question about one document.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAnswer {
    pub answer: String,
    pub confidence: Option<f64>,
    /// Absent sources are represented as an empty vec.
    pub sources: Vec<String>,
    pub processing_time: Option<f64>,
}

/// Represents a single question-and-answer exchange within a query session.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExchange {
    pub id: Uuid,
    pub filename: String,
    pub question: String,
    pub response: QueryAnswer,
    pub timestamp: DateTime<Utc>,
}

/// Backend health as reported by `/health`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthReport {
    pub status: String,
    /// Service name to service state, in name order.
    pub services: Vec<(String, String)>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Aggregate figures over the cached document list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibrarySummary {
    pub total_documents: usize,
    pub ready_documents: usize,
    pub total_bytes: u64,
    /// Document type to count, in type order.
    pub by_type: Vec<(String, usize)>,
}

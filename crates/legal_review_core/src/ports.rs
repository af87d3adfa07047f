//! crates/legal_review_core/src/ports.rs
//!
//! Defines the service contract (trait) between the coordination layer and the
//! document-analysis backend. The HTTP adapter in the client service implements
//! it; tests substitute in-memory fakes.

use crate::domain::{
    DocumentContent, DocumentRecord, HealthReport, QueryAnswer, UploadFile, UploadReceipt,
};
use async_trait::async_trait;

//=========================================================================================
// Transport Error and Result Types
//=========================================================================================

/// The classified failure of a backend call.
///
/// Raw status codes and transport details stop at the adapter; everything above
/// the port only sees these variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Document not found")]
    NotFound,
    #[error("Server error - please try again")]
    ServerError,
    #[error("Request timeout - document processing may take longer")]
    Timeout,
    #[error("Unable to connect to server")]
    NetworkUnreachable,
    #[error("Unexpected response: {0}")]
    Unknown(String),
}

/// A convenience type alias for `Result<T, TransportError>`.
pub type PortResult<T> = Result<T, TransportError>;

//=========================================================================================
// Backend Port
//=========================================================================================

#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// `GET /documents/`
    async fn list_documents(&self) -> PortResult<Vec<DocumentRecord>>;

    /// `POST /upload/` with the file as the multipart field `file`.
    async fn upload_document(&self, file: &UploadFile) -> PortResult<UploadReceipt>;

    /// `GET /documents/{filename}/content`
    async fn fetch_content(&self, filename: &str) -> PortResult<DocumentContent>;

    /// `DELETE /documents/{filename}`
    async fn delete_document(&self, filename: &str) -> PortResult<()>;

    /// `POST /ask/`
    async fn ask(&self, filename: &str, question: &str) -> PortResult<QueryAnswer>;

    /// `GET /health`
    async fn health(&self) -> PortResult<HealthReport>;
}

//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter for the document-analysis backend.
//! It implements the `BackendGateway` port from the `core` crate using `reqwest`,
//! and is the only place raw status codes and transport errors are seen.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use legal_review_core::ports::{BackendGateway, PortResult, TransportError};
use legal_review_core::{
    ContentMetadata, DocumentContent, DocumentRecord, HealthReport, QueryAnswer, UploadFile,
    UploadReceipt,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A request body accepted by [`HttpGateway::send`].
pub enum RequestBody {
    Json(Value),
    Multipart(Form),
}

/// An adapter that implements the `BackendGateway` port over HTTP/JSON.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Creates a new `HttpGateway`. Every request it issues is bounded by `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues one request and returns the decoded JSON body (`Null` when empty).
    #[instrument(skip(self, body), fields(base = %self.base_url))]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> PortResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Sending request");

        let mut request = self.client.request(method, &url);
        request = match body {
            Some(RequestBody::Json(json)) => request.json(&json),
            Some(RequestBody::Multipart(form)) => request.multipart(form),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            warn!(%url, error = %e, "Request failed without a response");
            classify_error(&e)
        })?;

        let status = response.status();
        if let Some(err) = classify_status(status) {
            warn!(%url, status = status.as_u16(), "Backend returned an error status");
            return Err(err);
        }

        let bytes = response.bytes().await.map_err(|e| classify_error(&e))?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(%url, error = %e, "Response body was not valid JSON");
            TransportError::Unknown(format!("invalid JSON body: {}", e))
        })
    }

    async fn send_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> PortResult<T> {
        let value = self.send(method, path, body).await?;
        serde_json::from_value(value)
            .map_err(|e| TransportError::Unknown(format!("unexpected response shape: {}", e)))
    }
}

/// Path of one document; the filename is percent-encoded.
fn document_path(filename: &str) -> String {
    format!("/documents/{}", urlencoding::encode(filename))
}

/// Maps an HTTP status to the client's error taxonomy. `None` for success.
pub fn classify_status(status: StatusCode) -> Option<TransportError> {
    if status.is_success() {
        None
    } else if status == StatusCode::NOT_FOUND {
        Some(TransportError::NotFound)
    } else if status.is_server_error() {
        Some(TransportError::ServerError)
    } else {
        Some(TransportError::Unknown(
            status
                .canonical_reason()
                .unwrap_or("unexpected response status")
                .to_string(),
        ))
    }
}

/// Maps a `reqwest` failure to the client's error taxonomy.
pub fn classify_error(err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if let Some(status) = err.status() {
        classify_status(status).unwrap_or_else(|| TransportError::Unknown(err.to_string()))
    } else if err.is_decode() || err.is_builder() {
        TransportError::Unknown(err.to_string())
    } else {
        TransportError::NetworkUnreachable
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct DocumentWire {
    filename: String,
    original_name: String,
    file_size: u64,
    upload_date: String,
    document_type: String,
    status: String,
}
impl DocumentWire {
    fn to_domain(self) -> PortResult<DocumentRecord> {
        let upload_date = parse_timestamp(&self.upload_date).ok_or_else(|| {
            TransportError::Unknown(format!("invalid upload_date '{}'", self.upload_date))
        })?;
        Ok(DocumentRecord {
            filename: self.filename,
            original_name: self.original_name,
            file_size: self.file_size,
            upload_date,
            document_type: self.document_type,
            status: self.status,
        })
    }
}

#[derive(Deserialize)]
struct UploadWire {
    message: String,
    filename: String,
    file_size: Option<u64>,
    document_type: Option<String>,
}
impl UploadWire {
    fn to_domain(self) -> UploadReceipt {
        UploadReceipt {
            message: self.message,
            filename: self.filename,
            file_size: self.file_size,
            document_type: self.document_type,
        }
    }
}

#[derive(Deserialize, Default)]
struct MetadataWire {
    file_size: Option<u64>,
    file_type: Option<String>,
    upload_date: Option<String>,
    word_count: Option<usize>,
}

#[derive(Deserialize)]
struct ContentWire {
    content: Option<String>,
    pages: Option<Vec<String>>,
    metadata: Option<MetadataWire>,
}
impl ContentWire {
    /// `pages` wins when present; a bare `content` string becomes a single page.
    fn to_domain(self, filename: &str) -> DocumentContent {
        let pages = match (self.pages, self.content) {
            (Some(pages), _) if !pages.is_empty() => pages,
            (_, Some(content)) => vec![content],
            (pages, None) => pages.unwrap_or_default(),
        };
        let metadata = self.metadata.map(|m| ContentMetadata {
            file_size: m.file_size,
            file_type: m.file_type,
            upload_date: m.upload_date.as_deref().and_then(parse_timestamp),
            word_count: m.word_count.unwrap_or(0),
        });
        DocumentContent::new(filename.to_string(), pages, metadata)
    }
}

#[derive(Serialize)]
struct AskRequest<'a> {
    filename: &'a str,
    question: &'a str,
}

#[derive(Deserialize)]
struct AnswerWire {
    answer: String,
    confidence: Option<f64>,
    sources: Option<Vec<String>>,
    processing_time: Option<f64>,
}
impl AnswerWire {
    fn to_domain(self) -> QueryAnswer {
        QueryAnswer {
            answer: self.answer,
            confidence: self.confidence,
            sources: self.sources.unwrap_or_default(),
            processing_time: self.processing_time,
        }
    }
}

#[derive(Deserialize)]
struct HealthWire {
    status: String,
    #[serde(default)]
    services: BTreeMap<String, Value>,
}
impl HealthWire {
    fn to_domain(self) -> HealthReport {
        let services = self
            .services
            .into_iter()
            .map(|(name, state)| {
                let state = match state {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (name, state)
            })
            .collect();
        HealthReport {
            status: self.status,
            services,
        }
    }
}

/// Accepts RFC 3339 timestamps and the zone-less ISO form the backend emits.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

//=========================================================================================
// `BackendGateway` Trait Implementation
//=========================================================================================

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn list_documents(&self) -> PortResult<Vec<DocumentRecord>> {
        let records: Vec<DocumentWire> = self.send_as(Method::GET, "/documents/", None).await?;
        records.into_iter().map(DocumentWire::to_domain).collect()
    }

    async fn upload_document(&self, file: &UploadFile) -> PortResult<UploadReceipt> {
        let part = Part::bytes(file.data.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| TransportError::Unknown(e.to_string()))?;
        let form = Form::new().part("file", part);

        let receipt: UploadWire = self
            .send_as(Method::POST, "/upload/", Some(RequestBody::Multipart(form)))
            .await?;
        Ok(receipt.to_domain())
    }

    async fn fetch_content(&self, filename: &str) -> PortResult<DocumentContent> {
        let path = format!("{}/content", document_path(filename));
        let content: ContentWire = self.send_as(Method::GET, &path, None).await?;
        Ok(content.to_domain(filename))
    }

    async fn delete_document(&self, filename: &str) -> PortResult<()> {
        self.send(Method::DELETE, &document_path(filename), None)
            .await
            .map(|_| ())
    }

    async fn ask(&self, filename: &str, question: &str) -> PortResult<QueryAnswer> {
        let body = serde_json::to_value(AskRequest { filename, question })
            .map_err(|e| TransportError::Unknown(e.to_string()))?;
        let answer: AnswerWire = self
            .send_as(Method::POST, "/ask/", Some(RequestBody::Json(body)))
            .await?;
        Ok(answer.to_domain())
    }

    async fn health(&self) -> PortResult<HealthReport> {
        let health: HealthWire = self.send_as(Method::GET, "/health", None).await?;
        Ok(health.to_domain())
    }
}

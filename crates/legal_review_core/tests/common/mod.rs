#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use legal_review_core::{
    BackendGateway, DocumentContent, DocumentRecord, HealthReport, PortResult, QueryAnswer,
    TransportError, UploadFile, UploadReceipt,
};
use tokio::sync::Notify;

/// The calls a `FakeBackend` can hold in flight or fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    List,
    Upload,
    Delete,
    Content,
    Ask,
}

/// In-memory backend with call counters, per-call gates and injectable failures.
#[derive(Default)]
pub struct FakeBackend {
    documents: Mutex<Vec<DocumentRecord>>,
    answer: Mutex<Option<QueryAnswer>>,
    counts: Mutex<HashMap<Call, usize>>,
    gates: Mutex<HashMap<Call, Arc<Notify>>>,
    once_gates: Mutex<HashMap<Call, (Arc<Notify>, bool)>>,
    failures: Mutex<HashMap<Call, TransportError>>,
    uploads: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_documents(names: &[&str]) -> Arc<Self> {
        let backend = Self::default();
        *backend.documents.lock().unwrap() = names.iter().map(|n| record(n)).collect();
        Arc::new(backend)
    }

    pub fn count(&self, call: Call) -> usize {
        self.counts.lock().unwrap().get(&call).copied().unwrap_or(0)
    }

    /// Makes every `call` wait until `release` is called once per waiting call.
    pub fn hold(&self, call: Call) {
        self.gates
            .lock()
            .unwrap()
            .insert(call, Arc::new(Notify::new()));
    }

    /// Makes only the next `call` wait; later ones pass straight through.
    pub fn hold_once(&self, call: Call) {
        self.once_gates
            .lock()
            .unwrap()
            .insert(call, (Arc::new(Notify::new()), false));
    }

    pub fn release(&self, call: Call) {
        if let Some(gate) = self.gates.lock().unwrap().get(&call) {
            gate.notify_one();
            return;
        }
        if let Some((gate, _)) = self.once_gates.lock().unwrap().remove(&call) {
            gate.notify_one();
        }
    }

    pub fn fail(&self, call: Call, err: TransportError) {
        self.failures.lock().unwrap().insert(call, err);
    }

    pub fn recover(&self, call: Call) {
        self.failures.lock().unwrap().remove(&call);
    }

    pub fn set_answer(&self, answer: QueryAnswer) {
        *self.answer.lock().unwrap() = Some(answer);
    }

    async fn enter(&self, call: Call) -> PortResult<()> {
        *self.counts.lock().unwrap().entry(call).or_default() += 1;
        let gate = self.gates.lock().unwrap().get(&call).cloned().or_else(|| {
            match self.once_gates.lock().unwrap().get_mut(&call) {
                Some((gate, taken)) if !*taken => {
                    *taken = true;
                    Some(gate.clone())
                }
                _ => None,
            }
        });
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.failures.lock().unwrap().get(&call) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

pub fn record(filename: &str) -> DocumentRecord {
    DocumentRecord {
        filename: filename.to_string(),
        original_name: filename.to_string(),
        file_size: 1024,
        upload_date: Utc::now(),
        document_type: "pdf".to_string(),
        status: "ready".to_string(),
    }
}

pub fn pdf(name: &str) -> UploadFile {
    UploadFile::from_name(name, b"%PDF-1.7 test".to_vec())
}

#[async_trait]
impl BackendGateway for FakeBackend {
    async fn list_documents(&self) -> PortResult<Vec<DocumentRecord>> {
        // The list is read when the request arrives, not when it returns.
        let documents = self.documents.lock().unwrap().clone();
        self.enter(Call::List).await?;
        Ok(documents)
    }

    async fn upload_document(&self, file: &UploadFile) -> PortResult<UploadReceipt> {
        self.enter(Call::Upload).await?;
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        let filename = format!("{:04}_{}", n, file.name);
        self.documents.lock().unwrap().push(record(&filename));
        Ok(UploadReceipt {
            message: "File uploaded successfully.".to_string(),
            filename,
            file_size: Some(file.size()),
            document_type: Some("pdf".to_string()),
        })
    }

    async fn fetch_content(&self, filename: &str) -> PortResult<DocumentContent> {
        self.enter(Call::Content).await?;
        Ok(DocumentContent::new(
            filename.to_string(),
            vec![format!("Contents of {}", filename)],
            None,
        ))
    }

    async fn delete_document(&self, filename: &str) -> PortResult<()> {
        self.enter(Call::Delete).await?;
        let mut docs = self.documents.lock().unwrap();
        let before = docs.len();
        docs.retain(|d| d.filename != filename);
        if docs.len() == before {
            return Err(TransportError::NotFound);
        }
        Ok(())
    }

    async fn ask(&self, _filename: &str, question: &str) -> PortResult<QueryAnswer> {
        self.enter(Call::Ask).await?;
        let answer = self.answer.lock().unwrap().clone();
        Ok(answer.unwrap_or_else(|| QueryAnswer {
            answer: format!("Answer to: {}", question),
            confidence: None,
            sources: Vec::new(),
            processing_time: None,
        }))
    }

    async fn health(&self) -> PortResult<HealthReport> {
        Ok(HealthReport {
            status: "healthy".to_string(),
            services: vec![("api".to_string(), "running".to_string())],
        })
    }
}

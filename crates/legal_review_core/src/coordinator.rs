//! crates/legal_review_core/src/coordinator.rs
//!
//! The mutation coordinator: one entry point per operation kind, each following
//! the same protocol (validate, reject duplicates, go pending, call the backend,
//! record the outcome, apply side effects).

use crate::cache::DocumentCache;
use crate::domain::{
    DocumentContent, DocumentRecord, HealthReport, QueryExchange, UploadFile, UploadReceipt,
};
use crate::error::{ClientError, ClientResult};
use crate::operation::{lock, OperationKind, OperationSlot, OperationState};
use crate::ports::BackendGateway;
use crate::progress::{UploadProgress, UploadProgressEstimator};
use crate::session::QuerySession;
use crate::validation::{validate_filename, validate_question, validate_upload};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Owns the client-side state and is the only writer of the document cache.
///
/// Created once at start-up and shared by reference (`Arc`) with whatever
/// presents the state.
pub struct MutationCoordinator {
    gateway: Arc<dyn BackendGateway>,
    cache: DocumentCache,
    progress: UploadProgressEstimator,
    session: Mutex<QuerySession>,
    contents: Mutex<HashMap<String, DocumentContent>>,
    upload: OperationSlot<UploadReceipt>,
    delete: OperationSlot<String>,
    view: OperationSlot<DocumentContent>,
    query: OperationSlot<QueryExchange>,
}

impl MutationCoordinator {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self::with_progress(gateway, UploadProgressEstimator::default())
    }

    pub fn with_progress(gateway: Arc<dyn BackendGateway>, progress: UploadProgressEstimator) -> Self {
        Self {
            gateway,
            cache: DocumentCache::new(),
            progress,
            session: Mutex::new(QuerySession::new()),
            contents: Mutex::new(HashMap::new()),
            upload: OperationSlot::new(OperationKind::Upload),
            delete: OperationSlot::new(OperationKind::Delete),
            view: OperationSlot::new(OperationKind::View),
            query: OperationSlot::new(OperationKind::Query),
        }
    }

    //=====================================================================================
    // Document List
    //=====================================================================================

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    /// Returns the document list, fetching it first if the cache is stale.
    pub async fn documents(&self) -> ClientResult<Arc<Vec<DocumentRecord>>> {
        if self.cache.is_stale() {
            return self.refresh_documents().await;
        }
        Ok(self.cache.list())
    }

    /// Fetches the authoritative list and swaps it into the cache.
    ///
    /// A list that was requested before a later mutation invalidated the cache
    /// is dropped, and the caller gets the current snapshot instead.
    pub async fn refresh_documents(&self) -> ClientResult<Arc<Vec<DocumentRecord>>> {
        let generation = self.cache.generation();
        let records = self.gateway.list_documents().await.map_err(|e| {
            error!(error = %e, "Failed to fetch document list");
            ClientError::from(e)
        })?;
        let count = records.len();
        if self.cache.replace_if_current(generation, records) {
            info!(count, "Document list refreshed");
        }
        Ok(self.cache.list())
    }

    /// Invalidate-then-refetch after a successful mutation. A failed refetch
    /// leaves the cache stale so the next `documents()` call tries again.
    async fn resync_documents(&self) {
        self.cache.invalidate();
        if let Err(e) = self.refresh_documents().await {
            warn!(error = %e, "Document list refresh after mutation failed; cache left stale");
        }
    }

    //=====================================================================================
    // Mutations
    //=====================================================================================

    pub async fn upload(&self, file: UploadFile) -> ClientResult<UploadReceipt> {
        validate_upload(&file)?;
        let pending = self.upload.begin()?.on_abandon(|| self.progress.fail());
        self.progress.start();
        info!(name = %file.name, size = file.size(), "Upload started");

        match self.gateway.upload_document(&file).await {
            Ok(receipt) => {
                self.resync_documents().await;
                self.progress.complete();
                info!(filename = %receipt.filename, "Upload succeeded");
                pending.succeed(receipt.clone());
                Ok(receipt)
            }
            Err(e) => {
                self.progress.fail();
                error!(name = %file.name, error = %e, "Upload failed");
                pending.fail(e.clone());
                Err(e.into())
            }
        }
    }

    /// Deletes `filename`. `confirmed` is the caller's record that the user agreed.
    pub async fn delete(&self, filename: &str, confirmed: bool) -> ClientResult<()> {
        if !confirmed {
            return Err(ClientError::validation("deletion must be confirmed by the user"));
        }
        validate_filename(filename)?;
        let pending = self.delete.begin()?;
        info!(%filename, "Delete started");

        match self.gateway.delete_document(filename).await {
            Ok(()) => {
                self.resync_documents().await;
                info!(%filename, "Delete succeeded");
                pending.succeed(filename.to_string());
                Ok(())
            }
            Err(e) => {
                error!(%filename, error = %e, "Delete failed");
                pending.fail(e.clone());
                Err(e.into())
            }
        }
    }

    /// Fetches the extracted text of `filename` and keeps it for viewing.
    pub async fn fetch_content(&self, filename: &str) -> ClientResult<DocumentContent> {
        validate_filename(filename)?;
        let pending = self.view.begin()?;
        info!(%filename, "Fetching document content");

        match self.gateway.fetch_content(filename).await {
            Ok(content) => {
                info!(%filename, pages = content.page_count(), "Document content fetched");
                lock(&self.contents).insert(filename.to_string(), content.clone());
                pending.succeed(content.clone());
                Ok(content)
            }
            Err(e) => {
                error!(%filename, error = %e, "Fetching document content failed");
                pending.fail(e.clone());
                Err(e.into())
            }
        }
    }

    /// Asks `question` about `filename`. The selection is left alone; the answer
    /// joins the history only if `filename` is the selected document on return.
    pub async fn query(&self, filename: &str, question: &str) -> ClientResult<QueryExchange> {
        let question = validate_question(question)?;
        validate_filename(filename)?;
        let pending = self.query.begin()?;
        info!(%filename, %question, "Query started");

        match self.gateway.ask(filename, &question).await {
            Ok(response) => {
                let exchange = QueryExchange {
                    id: Uuid::new_v4(),
                    filename: filename.to_string(),
                    question,
                    response,
                    timestamp: Utc::now(),
                };
                info!(%filename, sources = exchange.response.sources.len(), "Query answered");
                lock(&self.session).record(exchange.clone());
                pending.succeed(exchange.clone());
                Ok(exchange)
            }
            Err(e) => {
                error!(%filename, error = %e, "Query failed");
                pending.fail(e.clone());
                Err(e.into())
            }
        }
    }

    pub async fn health(&self) -> ClientResult<HealthReport> {
        Ok(self.gateway.health().await?)
    }

    //=====================================================================================
    // Observed State
    //=====================================================================================

    pub fn state(&self, kind: OperationKind) -> OperationState<()> {
        fn erase<T>(state: OperationState<T>) -> OperationState<()> {
            match state {
                OperationState::Idle => OperationState::Idle,
                OperationState::Pending => OperationState::Pending,
                OperationState::Success(_) => OperationState::Success(()),
                OperationState::Error(e) => OperationState::Error(e),
            }
        }
        match kind {
            OperationKind::Upload => erase(self.upload.snapshot()),
            OperationKind::Delete => erase(self.delete.snapshot()),
            OperationKind::View => erase(self.view.snapshot()),
            OperationKind::Query => erase(self.query.snapshot()),
        }
    }

    pub fn upload_state(&self) -> OperationState<UploadReceipt> {
        self.upload.snapshot()
    }

    pub fn delete_state(&self) -> OperationState<String> {
        self.delete.snapshot()
    }

    pub fn view_state(&self) -> OperationState<DocumentContent> {
        self.view.snapshot()
    }

    pub fn query_state(&self) -> OperationState<QueryExchange> {
        self.query.snapshot()
    }

    pub fn content(&self, filename: &str) -> Option<DocumentContent> {
        lock(&self.contents).get(filename).cloned()
    }

    pub fn progress(&self) -> UploadProgress {
        self.progress.current()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<UploadProgress> {
        self.progress.subscribe()
    }

    //=====================================================================================
    // Selection & Query Session
    //=====================================================================================

    pub fn selected_document(&self) -> Option<String> {
        lock(&self.session).document().map(str::to_string)
    }

    /// Explicit user selection. Choosing a different document clears the query history.
    pub fn select_document(&self, filename: Option<String>) {
        if lock(&self.session).select(filename.clone()) {
            info!(selected = ?filename, "Selected document changed");
        }
    }

    /// Exchanges for the selected document, most recent first.
    pub fn query_history(&self) -> Vec<QueryExchange> {
        lock(&self.session).history().to_vec()
    }

    pub fn with_session<R>(&self, f: impl FnOnce(&mut QuerySession) -> R) -> R {
        f(&mut lock(&self.session))
    }

    /// Tears down the progress timer. Further calls remain usable.
    pub fn shutdown(&self) {
        self.progress.shutdown();
    }
}

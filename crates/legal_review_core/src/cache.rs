//! crates/legal_review_core/src/cache.rs
//!
//! The in-memory document list. Snapshots are swapped whole, so a reader
//! either sees the previous list or the new one, never a mix.

use crate::domain::{DocumentRecord, LibrarySummary};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Keyed cache of `DocumentRecord`s. Starts empty and stale.
///
/// Every change bumps a generation counter. A fetch captures the generation
/// before going to the backend and may only land if nothing changed meanwhile.
pub struct DocumentCache {
    state: RwLock<Snapshot>,
    stale: AtomicBool,
}

struct Snapshot {
    records: Arc<Vec<DocumentRecord>>,
    generation: u64,
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentCache {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Snapshot {
                records: Arc::new(Vec::new()),
                generation: 0,
            }),
            stale: AtomicBool::new(true),
        }
    }

    /// Returns the last successfully fetched snapshot; empty before the first fetch.
    pub fn list(&self) -> Arc<Vec<DocumentRecord>> {
        self.read().records.clone()
    }

    /// The current generation. Capture it before fetching and hand it to
    /// [`DocumentCache::replace_if_current`].
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Atomically replaces the whole snapshot and clears the stale flag.
    ///
    /// Records repeating an earlier `filename` are dropped so the cache never
    /// holds two entries with the same key.
    pub fn replace_all(&self, records: Vec<DocumentRecord>) {
        let unique = dedupe(records);
        let mut state = self.write();
        Self::install(&mut state, &self.stale, unique);
    }

    /// Like [`DocumentCache::replace_all`], but only if the cache is still at
    /// `generation`. A list fetched before a later change is discarded.
    pub fn replace_if_current(&self, generation: u64, records: Vec<DocumentRecord>) -> bool {
        let unique = dedupe(records);
        let mut state = self.write();
        if state.generation != generation {
            debug!(
                fetched_at = generation,
                current = state.generation,
                "Discarding outdated document list"
            );
            return false;
        }
        Self::install(&mut state, &self.stale, unique);
        true
    }

    /// Marks the snapshot stale; the next read path must re-fetch. Fetches
    /// already in flight can no longer land.
    pub fn invalidate(&self) {
        let mut state = self.write();
        state.generation += 1;
        self.stale.store(true, Ordering::SeqCst);
        debug!(generation = state.generation, "Document cache invalidated");
    }

    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn install(state: &mut Snapshot, stale: &AtomicBool, records: Vec<DocumentRecord>) {
        debug!(count = records.len(), "Replacing document cache snapshot");
        state.records = Arc::new(records);
        state.generation += 1;
        stale.store(false, Ordering::SeqCst);
    }

    pub fn get(&self, filename: &str) -> Option<DocumentRecord> {
        self.list().iter().find(|r| r.filename == filename).cloned()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.list().iter().any(|r| r.filename == filename)
    }

    /// Totals over the current snapshot.
    pub fn summary(&self) -> LibrarySummary {
        let records = self.list();
        let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
        for record in records.iter() {
            *by_type.entry(record.document_type.clone()).or_default() += 1;
        }
        LibrarySummary {
            total_documents: records.len(),
            ready_documents: records.iter().filter(|r| r.is_ready()).count(),
            total_bytes: records.iter().map(|r| r.file_size).sum(),
            by_type: by_type.into_iter().collect(),
        }
    }
}

fn dedupe(records: Vec<DocumentRecord>) -> Vec<DocumentRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut unique = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(record.filename.clone()) {
            unique.push(record);
        } else {
            warn!(filename = %record.filename, "Dropping duplicate document record");
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(filename: &str, doc_type: &str, size: u64, status: &str) -> DocumentRecord {
        DocumentRecord {
            filename: filename.to_string(),
            original_name: filename.to_string(),
            file_size: size,
            upload_date: Utc::now(),
            document_type: doc_type.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn empty_cache_lists_nothing_and_is_stale() {
        let cache = DocumentCache::new();
        assert!(cache.list().is_empty());
        assert!(cache.is_stale());
    }

    #[test]
    fn replace_all_swaps_and_dedupes() {
        let cache = DocumentCache::new();
        cache.replace_all(vec![
            record("a.pdf", "pdf", 10, "ready"),
            record("b.docx", "docx", 20, "ready"),
            record("a.pdf", "pdf", 99, "error"),
        ]);
        let list = cache.list();
        assert_eq!(list.len(), 2);
        assert_eq!(cache.get("a.pdf").map(|r| r.file_size), Some(10));
        assert!(!cache.is_stale());

        cache.replace_all(vec![record("c.pdf", "pdf", 5, "ready")]);
        assert!(!cache.contains("a.pdf"));
        assert!(cache.contains("c.pdf"));
        // The old snapshot handed out earlier is untouched.
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn invalidate_keeps_snapshot_but_marks_stale() {
        let cache = DocumentCache::new();
        cache.replace_all(vec![record("a.pdf", "pdf", 10, "ready")]);
        cache.invalidate();
        assert!(cache.is_stale());
        assert_eq!(cache.list().len(), 1);
    }

    #[test]
    fn fetch_started_before_invalidate_is_discarded() {
        let cache = DocumentCache::new();
        cache.replace_all(vec![record("a.pdf", "pdf", 10, "ready")]);

        let before = cache.generation();
        cache.invalidate();
        cache.replace_all(vec![record("b.pdf", "pdf", 10, "ready")]);

        assert!(!cache.replace_if_current(before, vec![record("a.pdf", "pdf", 10, "ready")]));
        assert!(!cache.contains("a.pdf"));
        assert!(cache.contains("b.pdf"));

        let now = cache.generation();
        assert!(cache.replace_if_current(now, vec![record("c.pdf", "pdf", 10, "ready")]));
        assert!(cache.contains("c.pdf"));
        assert!(!cache.is_stale());
    }

    #[test]
    fn summary_counts_types_and_sizes() {
        let cache = DocumentCache::new();
        cache.replace_all(vec![
            record("a.pdf", "pdf", 10, "ready"),
            record("b.pdf", "pdf", 15, "processing"),
            record("c.docx", "docx", 5, "Ready"),
        ]);
        let summary = cache.summary();
        assert_eq!(summary.total_documents, 3);
        assert_eq!(summary.ready_documents, 2);
        assert_eq!(summary.total_bytes, 30);
        assert_eq!(
            summary.by_type,
            vec![("docx".to_string(), 1), ("pdf".to_string(), 2)]
        );
    }
}

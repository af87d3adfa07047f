//! crates/legal_review_core/src/session.rs
//!
//! The question/answer history for the currently selected document.

use crate::domain::QueryExchange;
use tracing::debug;

/// Prompts offered before the first question of a session.
pub const SUGGESTED_QUESTIONS: [&str; 6] = [
    "What are the key terms and conditions in this document?",
    "Who are the parties involved in this agreement?",
    "What are the important dates mentioned?",
    "Are there any liability clauses?",
    "What are the termination conditions?",
    "Summarize the main obligations of each party",
];

/// In-memory, most-recent-first log of exchanges for one document.
#[derive(Debug, Default)]
pub struct QuerySession {
    document: Option<String>,
    history: Vec<QueryExchange>,
    draft: String,
}

impl QuerySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Scopes the session to `document`. A different document starts an empty log.
    /// Returns whether the scope changed.
    pub fn select(&mut self, document: Option<String>) -> bool {
        if self.document == document {
            return false;
        }
        debug!(
            from = ?self.document,
            to = ?document,
            dropped = self.history.len(),
            "Query session rescoped"
        );
        self.document = document;
        self.history.clear();
        self.draft.clear();
        true
    }

    /// Prepends `exchange` if it belongs to the session's document.
    ///
    /// Answers arriving for a document that is no longer selected are dropped,
    /// so histories never mix documents.
    pub fn record(&mut self, exchange: QueryExchange) -> bool {
        if self.document.as_deref() != Some(exchange.filename.as_str()) {
            debug!(filename = %exchange.filename, "Discarding exchange for unselected document");
            return false;
        }
        self.history.insert(0, exchange);
        self.draft.clear();
        true
    }

    /// Exchanges, most recent first.
    pub fn history(&self) -> &[QueryExchange] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Canned prompts while nothing has been asked yet.
    pub fn suggestions(&self) -> &'static [&'static str] {
        if self.history.is_empty() {
            &SUGGESTED_QUESTIONS
        } else {
            &[]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QueryAnswer;
    use chrono::Utc;
    use uuid::Uuid;

    fn exchange(filename: &str, question: &str) -> QueryExchange {
        QueryExchange {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            question: question.to_string(),
            response: QueryAnswer {
                answer: "answer".to_string(),
                confidence: None,
                sources: Vec::new(),
                processing_time: None,
            },
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn most_recent_first_and_repeats_kept() {
        let mut session = QuerySession::new();
        session.select(Some("a.pdf".into()));
        assert!(session.record(exchange("a.pdf", "first")));
        assert!(session.record(exchange("a.pdf", "second")));
        assert!(session.record(exchange("a.pdf", "second")));

        let questions: Vec<_> = session.history().iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, ["second", "second", "first"]);
    }

    #[test]
    fn selecting_another_document_clears_history_and_draft() {
        let mut session = QuerySession::new();
        session.select(Some("a.pdf".into()));
        session.record(exchange("a.pdf", "q1"));
        session.set_draft("half-typed");

        assert!(!session.select(Some("a.pdf".into())));
        assert_eq!(session.len(), 1);

        assert!(session.select(Some("b.pdf".into())));
        assert!(session.is_empty());
        assert_eq!(session.draft(), "");
    }

    #[test]
    fn exchanges_for_other_documents_are_dropped() {
        let mut session = QuerySession::new();
        assert!(!session.record(exchange("a.pdf", "no selection")));

        session.select(Some("b.pdf".into()));
        assert!(!session.record(exchange("a.pdf", "stale")));
        assert!(session.is_empty());
    }

    #[test]
    fn suggestions_only_before_first_question() {
        let mut session = QuerySession::new();
        session.select(Some("a.pdf".into()));
        assert_eq!(session.suggestions().len(), 6);
        session.record(exchange("a.pdf", "q"));
        assert!(session.suggestions().is_empty());
    }
}

//! services/client/src/cli.rs
//!
//! The `legal-review` command line. Each subcommand drives one coordinator
//! operation and renders the outcome as plain text.

use crate::error::AppError;
use chrono::Local;
use clap::{Parser, Subcommand};
use legal_review_core::{
    DocumentContent, DocumentRecord, HealthReport, LibrarySummary, MutationCoordinator,
    ProgressPhase, QueryExchange, UploadFile, SUGGESTED_QUESTIONS,
};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "legal-review")]
#[command(version, about = "Upload, browse and question legal documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the analysis backend is reachable
    Health,

    /// List uploaded documents
    List,

    /// Summarize the document library
    Stats,

    /// Upload a PDF or DOCX file
    Upload {
        /// Path of the file to upload
        path: PathBuf,
    },

    /// Delete a document
    Delete {
        /// Server-side filename, as shown by `list`
        filename: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Show the extracted text of a document
    View {
        filename: String,

        /// 1-based page to show; all pages when omitted
        #[arg(short, long)]
        page: Option<usize>,
    },

    /// Ask one or more questions about a document
    Ask {
        filename: String,

        /// Questions to ask, in order. Lists suggested questions when empty.
        questions: Vec<String>,
    },
}

/// Runs a single command against the coordinator.
pub async fn run(command: Command, coordinator: Arc<MutationCoordinator>) -> Result<(), AppError> {
    match command {
        Command::Health => {
            let report = coordinator.health().await?;
            println!("{}", render_health(&report));
        }
        Command::List => {
            let documents = coordinator.documents().await?;
            println!("{}", render_documents(&documents));
        }
        Command::Stats => {
            coordinator.documents().await?;
            println!("{}", render_summary(&coordinator.cache().summary()));
        }
        Command::Upload { path } => upload(&coordinator, path).await?,
        Command::Delete { filename, yes } => {
            coordinator.delete(&filename, yes).await?;
            println!("Deleted {}", filename);
        }
        Command::View { filename, page } => {
            let content = coordinator.fetch_content(&filename).await?;
            println!("{}", render_content(&content, page)?);
        }
        Command::Ask {
            filename,
            questions,
        } => {
            if questions.is_empty() {
                println!("Suggested questions:");
                for question in SUGGESTED_QUESTIONS {
                    println!("  - {}", question);
                }
                return Ok(());
            }
            coordinator.select_document(Some(filename.clone()));
            for question in &questions {
                coordinator.query(&filename, question).await?;
            }
            println!("{}", render_history(&coordinator.query_history()));
        }
    }
    Ok(())
}

async fn upload(coordinator: &Arc<MutationCoordinator>, path: PathBuf) -> Result<(), AppError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::Internal(format!("'{}' has no file name", path.display())))?
        .to_string();
    let data = tokio::fs::read(&path).await?;
    let file = UploadFile::from_name(name, data);
    info!(name = %file.name, size = file.size(), "Uploading document");

    let mut progress = coordinator.subscribe_progress();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let current = *progress.borrow_and_update();
            match current.phase {
                ProgressPhase::Running => eprint!("\rUploading... {:>3.0}%", current.percent),
                ProgressPhase::Completing => {
                    eprintln!("\rUploading... 100%");
                    break;
                }
                ProgressPhase::Idle => break,
            }
        }
    });

    let receipt = match coordinator.upload(file).await {
        Ok(receipt) => {
            if let Err(e) = reporter.await {
                warn!("Progress reporter task failed: {}", e);
            }
            receipt
        }
        Err(e) => {
            reporter.abort();
            eprintln!();
            return Err(e.into());
        }
    };
    println!("{}", receipt.message);
    println!("Stored as {}", receipt.filename);
    Ok(())
}

//=========================================================================================
// Rendering
//=========================================================================================

pub fn render_health(report: &HealthReport) -> String {
    let mut out = format!("Backend status: {}", report.status);
    for (name, state) in &report.services {
        let _ = write!(out, "\n  {:<16} {}", name, state);
    }
    out
}

pub fn render_documents(documents: &[DocumentRecord]) -> String {
    if documents.is_empty() {
        return "No documents uploaded yet.".to_string();
    }
    let mut out = String::new();
    for (i, doc) in documents.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(
            out,
            "{}  {}  {}  {}  {}  ({})",
            doc.filename,
            doc.original_name,
            doc.document_type.to_uppercase(),
            format_size(doc.file_size),
            doc.upload_date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            doc.status,
        );
    }
    out
}

pub fn render_summary(summary: &LibrarySummary) -> String {
    let mut out = format!(
        "Documents: {} ({} ready)\nTotal size: {}",
        summary.total_documents,
        summary.ready_documents,
        format_size(summary.total_bytes)
    );
    for (kind, count) in &summary.by_type {
        let _ = write!(out, "\n  {:<8} {}", kind.to_uppercase(), count);
    }
    out
}

/// Renders one page, or every page with separators when `page` is `None`.
pub fn render_content(content: &DocumentContent, page: Option<usize>) -> Result<String, AppError> {
    let mut out = format!(
        "{} ({} pages, {} words)",
        content.filename,
        content.page_count(),
        content.metadata.word_count
    );
    match page {
        Some(n) => {
            let text = content.page(n).ok_or_else(|| {
                AppError::Internal(format!(
                    "page {} is out of range (1-{})",
                    n,
                    content.page_count()
                ))
            })?;
            let _ = write!(out, "\n\n--- Page {} ---\n{}", n, text);
        }
        None => {
            for (i, text) in content.pages.iter().enumerate() {
                let _ = write!(out, "\n\n--- Page {} ---\n{}", i + 1, text);
            }
        }
    }
    Ok(out)
}

/// Renders the session history, most recent exchange first.
pub fn render_history(history: &[QueryExchange]) -> String {
    let mut out = String::new();
    for (i, exchange) in history.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        let _ = write!(out, "Q: {}\nA: {}", exchange.question, exchange.response.answer);
        if let Some(confidence) = exchange.response.confidence {
            let _ = write!(out, "\n   confidence {:.0}%", confidence * 100.0);
        }
        if !exchange.response.sources.is_empty() {
            let _ = write!(out, "\n   sources: {}", exchange.response.sources.join("; "));
        }
    }
    out
}

/// Human-readable byte count (`B`, `KB`, `MB`, `GB`).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

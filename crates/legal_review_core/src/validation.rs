//! crates/legal_review_core/src/validation.rs
//!
//! Synchronous input checks run before any network call.

use crate::domain::{UploadFile, DOCX_MIME, MAX_QUESTION_CHARS, MAX_UPLOAD_BYTES, PDF_MIME};
use crate::error::{ClientError, ClientResult};

/// Returns the trimmed question, or a validation error if it is empty or too long.
pub fn validate_question(question: &str) -> ClientResult<String> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(ClientError::validation("question must not be empty"));
    }
    let chars = trimmed.chars().count();
    if chars > MAX_QUESTION_CHARS {
        return Err(ClientError::validation(format!(
            "question is {} characters; the limit is {}",
            chars, MAX_QUESTION_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_filename(filename: &str) -> ClientResult<()> {
    if filename.trim().is_empty() {
        return Err(ClientError::validation("filename must not be empty"));
    }
    Ok(())
}

/// Only non-empty PDF or DOCX files up to 50 MB are sent.
pub fn validate_upload(file: &UploadFile) -> ClientResult<()> {
    if file.name.trim().is_empty() {
        return Err(ClientError::validation("file name must not be empty"));
    }
    if file.data.is_empty() {
        return Err(ClientError::validation(format!("{} is empty", file.name)));
    }
    if file.size() > MAX_UPLOAD_BYTES {
        return Err(ClientError::validation(format!(
            "{} is {} bytes; the limit is {} bytes",
            file.name,
            file.size(),
            MAX_UPLOAD_BYTES
        )));
    }
    let essence = file
        .content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if essence != PDF_MIME && essence != DOCX_MIME {
        return Err(ClientError::validation(format!(
            "unsupported file type '{}'; please upload PDF or DOCX files only",
            file.content_type
        )));
    }
    Ok(())
}

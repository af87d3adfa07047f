//! crates/legal_review_core/src/error.rs
//!
//! The error type surfaced by the coordination layer.

use crate::operation::OperationKind;
use crate::ports::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Bad local input. No network call was attempted.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Another call of the same kind is still pending.
    #[error("A {0} operation is already in progress")]
    AlreadyInProgress(OperationKind),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// A convenience type alias for `Result<T, ClientError>`.
pub type ClientResult<T> = Result<T, ClientError>;

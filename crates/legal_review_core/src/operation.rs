//! crates/legal_review_core/src/operation.rs
//!
//! Per-kind lifecycle tracking for the mutation coordinator.

use crate::error::{ClientError, ClientResult};
use crate::ports::TransportError;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// The independently tracked operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Upload,
    Delete,
    View,
    Query,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Upload => "upload",
            OperationKind::Delete => "delete",
            OperationKind::View => "view",
            OperationKind::Query => "query",
        };
        f.write_str(name)
    }
}

/// The lifecycle of the latest operation of one kind.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationState<T> {
    Idle,
    Pending,
    Success(T),
    Error(TransportError),
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        OperationState::Idle
    }
}

impl<T> OperationState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, OperationState::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, OperationState::Pending)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            OperationState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TransportError> {
        match self {
            OperationState::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Holds the state of one operation kind and owns its transitions.
pub(crate) struct OperationSlot<T> {
    kind: OperationKind,
    state: Mutex<OperationState<T>>,
}

impl<T: Clone> OperationSlot<T> {
    pub(crate) fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            state: Mutex::new(OperationState::Idle),
        }
    }

    pub(crate) fn snapshot(&self) -> OperationState<T> {
        lock(&self.state).clone()
    }

    /// Moves the slot to `Pending`, rejecting the call if it already is.
    ///
    /// The check and the transition happen under one lock, so two interleaved
    /// callers can never both get through. The returned guard must be resolved
    /// with `succeed` or `fail`; dropping it unresolved puts the slot back to `Idle`.
    pub(crate) fn begin(&self) -> ClientResult<PendingGuard<'_, T>> {
        let mut state = lock(&self.state);
        if state.is_pending() {
            warn!(kind = %self.kind, "Rejected call: operation already in progress");
            return Err(ClientError::AlreadyInProgress(self.kind));
        }
        *state = OperationState::Pending;
        Ok(PendingGuard {
            slot: self,
            on_abandon: None,
            resolved: false,
        })
    }
}

/// A claim on a `Pending` slot, held across the backend call.
pub(crate) struct PendingGuard<'a, T> {
    slot: &'a OperationSlot<T>,
    on_abandon: Option<Box<dyn FnOnce() + Send + 'a>>,
    resolved: bool,
}

impl<'a, T> PendingGuard<'a, T> {
    /// Runs `f` if the guard is dropped without being resolved.
    pub(crate) fn on_abandon(mut self, f: impl FnOnce() + Send + 'a) -> Self {
        self.on_abandon = Some(Box::new(f));
        self
    }

    pub(crate) fn succeed(mut self, value: T) {
        self.resolved = true;
        *lock(&self.slot.state) = OperationState::Success(value);
    }

    pub(crate) fn fail(mut self, err: TransportError) {
        self.resolved = true;
        *lock(&self.slot.state) = OperationState::Error(err);
    }
}

impl<T> Drop for PendingGuard<'_, T> {
    fn drop(&mut self) {
        if self.resolved {
            return;
        }
        warn!(kind = %self.slot.kind, "Operation abandoned before completion");
        *lock(&self.slot.state) = OperationState::Idle;
        if let Some(f) = self.on_abandon.take() {
            f();
        }
    }
}

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

//! crates/legal_review_core/src/progress.rs
//!
//! Synthetic upload progress. The transport gives no byte-level feedback, so
//! while an upload is pending a timer nudges the value towards a cap; success
//! snaps it to 100 and failure drops it to 0.

use crate::operation::lock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

//=========================================================================================
// Progress Values
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Idle,
    Running,
    Completing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadProgress {
    pub phase: ProgressPhase,
    /// Percentage in `0.0..=100.0`.
    pub percent: f64,
}

impl UploadProgress {
    const IDLE: UploadProgress = UploadProgress {
        phase: ProgressPhase::Idle,
        percent: 0.0,
    };
}

#[derive(Debug, Clone)]
pub struct ProgressConfig {
    pub tick: Duration,
    pub hold: Duration,
    pub cap: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(500),
            hold: Duration::from_secs(2),
            cap: 90.0,
        }
    }
}

//=========================================================================================
// Increment Sources
//=========================================================================================

/// Supplies the amount added on each timer tick.
pub trait IncrementSource: Send {
    fn next_increment(&mut self) -> f64;
}

/// Uniform random increments in `[0, max)`.
pub struct RandomIncrements {
    rng: StdRng,
    max: f64,
}

impl RandomIncrements {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            max: 10.0,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max: 10.0,
        }
    }
}

impl Default for RandomIncrements {
    fn default() -> Self {
        Self::new()
    }
}

impl IncrementSource for RandomIncrements {
    fn next_increment(&mut self) -> f64 {
        self.rng.gen_range(0.0..self.max)
    }
}

/// Replays a fixed sequence, cycling when it runs out. An empty sequence yields 0.
pub struct FixedIncrements {
    steps: Vec<f64>,
    pos: usize,
}

impl FixedIncrements {
    pub fn new(steps: Vec<f64>) -> Self {
        Self { steps, pos: 0 }
    }
}

impl IncrementSource for FixedIncrements {
    fn next_increment(&mut self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        let step = self.steps[self.pos % self.steps.len()];
        self.pos += 1;
        step
    }
}

//=========================================================================================
// The Estimator
//=========================================================================================

struct Inner {
    config: ProgressConfig,
    tx: watch::Sender<UploadProgress>,
    increments: Mutex<Box<dyn IncrementSource>>,
    timer: Mutex<Option<CancellationToken>>,
}

impl Inner {
    fn advance(&self) {
        let raw = lock(&self.increments).next_increment();
        let step = if raw.is_finite() && raw > 0.0 { raw } else { 0.0 };
        let cap = self.config.cap;
        self.tx.send_modify(|p| {
            if p.phase == ProgressPhase::Running {
                p.percent = (p.percent + step).min(cap).max(p.percent);
            }
        });
    }

    /// Cancels the active timer, if any, and arms a fresh token for the next one.
    fn rearm(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(old) = lock(&self.timer).replace(token.clone()) {
            old.cancel();
        }
        token
    }

    fn cancel_timer(&self) {
        if let Some(old) = lock(&self.timer).take() {
            debug!("Cancelling upload progress timer");
            old.cancel();
        }
    }
}

/// Drives `Idle -> Running -> Completing -> Idle`. At most one timer task is alive.
pub struct UploadProgressEstimator {
    inner: Arc<Inner>,
}

impl UploadProgressEstimator {
    pub fn new(config: ProgressConfig, increments: impl IncrementSource + 'static) -> Self {
        let (tx, _rx) = watch::channel(UploadProgress::IDLE);
        Self {
            inner: Arc::new(Inner {
                config,
                tx,
                increments: Mutex::new(Box::new(increments)),
                timer: Mutex::new(None),
            }),
        }
    }

    pub fn current(&self) -> UploadProgress {
        *self.inner.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadProgress> {
        self.inner.tx.subscribe()
    }

    pub fn is_timer_active(&self) -> bool {
        lock(&self.inner.timer)
            .as_ref()
            .is_some_and(|t| !t.is_cancelled())
    }

    /// Enters `Running` from 0 and starts ticking. Any previous timer is cancelled first.
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let token = self.inner.rearm();
        self.inner.tx.send_replace(UploadProgress {
            phase: ProgressPhase::Running,
            percent: 0.0,
        });

        let inner = self.inner.clone();
        let tick = inner.config.tick;
        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + tick, tick);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => inner.advance(),
                }
            }
        });
    }

    /// Applies one increment immediately. Has no effect unless `Running`.
    pub fn advance(&self) -> UploadProgress {
        self.inner.advance();
        self.current()
    }

    /// Jumps to 100, then returns to `Idle` once the hold delay has passed.
    pub fn complete(&self) {
        let token = self.inner.rearm();
        self.inner.tx.send_replace(UploadProgress {
            phase: ProgressPhase::Completing,
            percent: 100.0,
        });

        let inner = self.inner.clone();
        let hold = inner.config.hold;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(hold) => {
                    inner.tx.send_if_modified(|p| {
                        if p.phase == ProgressPhase::Completing {
                            *p = UploadProgress::IDLE;
                            true
                        } else {
                            false
                        }
                    });
                    // A newer timer would have replaced the slot with a live token.
                    token.cancel();
                    let mut slot = lock(&inner.timer);
                    if slot.as_ref().is_some_and(CancellationToken::is_cancelled) {
                        slot.take();
                    }
                }
            }
        });
    }

    /// Drops straight back to 0 with no completion phase.
    pub fn fail(&self) {
        self.inner.cancel_timer();
        self.inner.tx.send_replace(UploadProgress::IDLE);
    }

    /// Tears down any active timer without touching the value.
    pub fn shutdown(&self) {
        self.inner.cancel_timer();
    }
}

impl Default for UploadProgressEstimator {
    fn default() -> Self {
        Self::new(ProgressConfig::default(), RandomIncrements::new())
    }
}

impl Drop for UploadProgressEstimator {
    fn drop(&mut self) {
        self.inner.cancel_timer();
    }
}

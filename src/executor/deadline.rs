//! Time budget and cancellation for a validation run
//!
//! A [`Deadline`] is threaded through the plugin download and the plugin
//! process so a caller can bound how long one validation may take.

use crate::pipeline::SyntaxError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared flag that aborts an in-flight validation
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; every clone observes it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`cancel`](Self::cancel) was called
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Optional point in time after which work is abandoned
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    at: Option<Instant>,
    budget: Option<Duration>,
    cancel: CancelToken,
}

impl Deadline {
    /// No time limit and no cancellation
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Expires `budget` from now
    ///
    /// A budget too large to represent as an [`Instant`] never expires.
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(budget),
            budget: Some(budget),
            cancel: CancelToken::new(),
        }
    }

    /// Expires `budget` from now if given, otherwise never
    #[must_use]
    pub fn from_timeout(budget: Option<Duration>) -> Self {
        budget.map_or_else(Self::none, Self::after)
    }

    /// Attaches a cancellation token
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Time left, `None` if unbounded
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Returns true if the deadline passed
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// Fails with `Cancelled` or `Timeout` if work must stop
    pub fn check(&self) -> Result<(), SyntaxError> {
        if self.cancel.is_cancelled() {
            return Err(SyntaxError::Cancelled);
        }
        if self.is_expired() {
            return Err(self.timeout_error());
        }
        Ok(())
    }

    pub(crate) fn timeout_error(&self) -> SyntaxError {
        SyntaxError::Timeout {
            duration: self.budget.unwrap_or_default(),
        }
    }
}

//! Single-flight process tracker.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use taskeval_core::constants::DEFAULT_PROCESS_TIMEOUT_MS;
use taskeval_core::error::{EvalError, Result};

/// Tracker configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlightConfig {
    /// Maximum processing duration in milliseconds
    pub timeout_ms: u64,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_PROCESS_TIMEOUT_MS,
        }
    }
}

/// Tracks identifiers with an evaluation attempt in flight.
///
/// `begin` performs its membership check and insertion under one lock
/// acquisition, so two attempts for the same identifier cannot both
/// succeed regardless of how their suspension points interleave. The
/// returned [`FlightPermit`] removes the identifier when dropped, which
/// makes release unconditional: normal completion, a business error, a
/// timeout, or cancellation of the whole future all take the same path
/// through `Drop`.
pub struct FlightTracker {
    active: Mutex<HashSet<String>>,
    config: FlightConfig,
}

impl FlightTracker {
    /// Creates a tracker with default configuration.
    pub fn new() -> Self {
        Self::with_config(FlightConfig::default())
    }

    /// Creates a tracker with custom configuration.
    pub fn with_config(config: FlightConfig) -> Self {
        Self {
            active: Mutex::new(HashSet::new()),
            config,
        }
    }

    /// Marks `id` as in flight.
    ///
    /// Fails with [`EvalError::AlreadyInProgress`] when the identifier is
    /// already tracked. On success the identifier stays tracked until the
    /// returned permit is dropped or explicitly ended.
    pub fn begin(&self, id: impl Into<String>) -> Result<FlightPermit<'_>> {
        let id = id.into();
        if !self.active.lock().insert(id.clone()) {
            return Err(EvalError::AlreadyInProgress(id));
        }
        Ok(FlightPermit { tracker: self, id })
    }

    /// Point-in-time membership check. Advisory only: the answer can be
    /// stale by the time the caller acts on it, so it must never be the
    /// sole gate before `begin`.
    pub fn is_in_progress(&self, id: &str) -> bool {
        self.active.lock().contains(id)
    }

    /// Number of identifiers currently in flight.
    pub fn count(&self) -> usize {
        self.active.lock().len()
    }

    /// The configured processing timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    fn release(&self, id: &str) {
        self.active.lock().remove(id);
    }

    fn timeout_error(&self, id: &str) -> EvalError {
        EvalError::ProcessingTimeout {
            id: id.into(),
            seconds: self.config.timeout_ms / 1000,
        }
    }

    /// Runs `work` under single-flight protection, racing it against the
    /// configured timeout.
    ///
    /// Whichever settles first determines the outcome; a result that
    /// arrives after the timeout is discarded. The in-flight marker is
    /// released on every path.
    pub async fn run<T, F>(&self, id: &str, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _permit = self.begin(id)?;
        match tokio::time::timeout(self.timeout(), work).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error(id)),
        }
    }

    /// Like [`run`](Self::run), additionally racing a caller-provided
    /// cancellation future. Cancellation surfaces as
    /// [`EvalError::Cancelled`]; the in-flight marker is still released.
    pub async fn run_with_cancel<T, F, C>(&self, id: &str, work: F, cancel: C) -> Result<T>
    where
        F: Future<Output = Result<T>>,
        C: Future<Output = ()>,
    {
        let _permit = self.begin(id)?;
        tokio::select! {
            result = work => result,
            _ = tokio::time::sleep(self.timeout()) => Err(self.timeout_error(id)),
            _ = cancel => Err(EvalError::Cancelled(id.into())),
        }
    }
}

impl Default for FlightTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks one identifier as in flight for as long as it is held.
///
/// Dropping the permit releases the identifier.
#[must_use = "the identifier is released as soon as the permit is dropped"]
pub struct FlightPermit<'a> {
    tracker: &'a FlightTracker,
    id: String,
}

impl FlightPermit<'_> {
    /// The tracked identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Explicitly releases the identifier. Equivalent to dropping.
    pub fn end(self) {}
}

impl Drop for FlightPermit<'_> {
    fn drop(&mut self) {
        self.tracker.release(&self.id);
    }
}

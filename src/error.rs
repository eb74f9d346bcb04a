//! Error types for the contest prediction pipeline.
//!
//! All fallible operations return `Result<T, PipelineError>`. Errors are
//! classified into kinds (see [`ErrorKind`]) that determine whether the
//! caller should retry, skip, or treat the failure as fatal.
//!
//! # Error Classification
//!
//! - **Transient** — upstream HTTP failure the Fetch Queue will retry itself.
//! - **PermanentUpstream** — retries exhausted; the caller treats the key as
//!   unresolved rather than failing outright.
//! - **Parse** — a single record was malformed; the batch continues.
//! - **Store** — a document-store operation failed; propagated or silenced
//!   per the handler's chosen policy.
//! - **Logic** — an invariant was violated. Fatal; never retried.
//!
//! # Propagation policy
//!
//! [`reraise`] and [`silence`] are the two composable wrappers handlers use
//! around a fallible stage (SPEC_FULL.md §7, §10.3).

use std::fmt;
use std::future::Future;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("upstream request failed: {0}")]
    Transient(String),

    #[error("upstream permanently unavailable for key {0}")]
    PermanentUpstream(String),

    #[error("failed to parse record: {0}")]
    Parse(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("invariant violated: {0}")]
    Logic(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Transient(_) => ErrorKind::Transient,
            PipelineError::PermanentUpstream(_) => ErrorKind::PermanentUpstream,
            PipelineError::Parse(_) => ErrorKind::Parse,
            PipelineError::Store(_) => ErrorKind::Store,
            PipelineError::Logic(_) => ErrorKind::Logic,
        }
    }

    /// Whether the Fetch Queue should requeue the request that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Transient(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    PermanentUpstream,
    Parse,
    Store,
    Logic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transient => write!(f, "TRANSIENT"),
            ErrorKind::PermanentUpstream => write!(f, "PERMANENT_UPSTREAM"),
            ErrorKind::Parse => write!(f, "PARSE"),
            ErrorKind::Store => write!(f, "STORE"),
            ErrorKind::Logic => write!(f, "LOGIC"),
        }
    }
}

impl From<mongodb::error::Error> for PipelineError {
    fn from(e: mongodb::error::Error) -> Self {
        PipelineError::Store(e.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for PipelineError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        PipelineError::Store(e.to_string())
    }
}

// ── Retry policy (Fetch Queue additive backoff) ─────────────────────────────

/// Additive backoff policy for the Fetch Queue (SPEC_FULL.md §4.1).
///
/// The round-level wait time grows by one unit per failed response observed
/// in the previous round, rather than backing off exponentially per item.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Base wait unit in milliseconds, added once per failure observed in a round.
    pub wait_unit_ms: u64,
    /// Maximum attempts per key before giving up.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            wait_unit_ms: 1_000,
            max_attempts: 10,
        }
    }
}

impl RetryPolicy {
    pub fn should_retry(&self, attempts_so_far: u32) -> bool {
        attempts_so_far < self.max_attempts
    }
}

/// Per-round retry bookkeeping for the Fetch Queue.
#[derive(Debug, Clone, Default)]
pub struct RetryState {
    pub wait_time_ms: u64,
}

impl RetryState {
    pub fn new() -> Self {
        Self { wait_time_ms: 0 }
    }

    /// Called once per round with the count of failures observed in that round.
    pub fn record_round(&mut self, policy: &RetryPolicy, failures_this_round: u32) {
        if failures_this_round > 0 {
            self.wait_time_ms += policy.wait_unit_ms * failures_this_round as u64;
        } else {
            self.wait_time_ms = 0;
        }
    }
}

// ── Propagation wrappers ─────────────────────────────────────────────────────

/// Run `fut`, logging success/failure and propagating any error to the caller.
///
/// Used for primary pipeline stages where the scheduler must see the failure
/// (generalizes `original_source/app/utils.py::exception_logger_reraise`).
pub async fn reraise<T, F>(label: &str, fut: F) -> Result<T, PipelineError>
where
    F: Future<Output = Result<T, PipelineError>>,
{
    tracing::info!(stage = label, "starting");
    match fut.await {
        Ok(v) => {
            tracing::info!(stage = label, "succeeded");
            Ok(v)
        }
        Err(e) => {
            tracing::error!(stage = label, error = %e, "failed");
            Err(e)
        }
    }
}

/// Run `fut`, logging success/failure but swallowing any error.
///
/// Used for best-effort stages (e.g. opportunistic user-cache refresh)
/// (generalizes `original_source/app/utils.py::exception_logger_silence`).
pub async fn silence<T, F>(label: &str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, PipelineError>>,
{
    tracing::info!(stage = label, "starting");
    match fut.await {
        Ok(v) => {
            tracing::info!(stage = label, "succeeded");
            Some(v)
        }
        Err(e) => {
            tracing::warn!(stage = label, error = %e, "swallowed failure");
            None
        }
    }
}

//! HTTP Fetch Queue (SPEC_FULL.md §4.1): bounded-concurrency, FIFO-requeue,
//! additive-backoff request dispatcher.
//!
//! Ported from `original_source/app/crawler/utils.py::multi_http_request`;
//! the bounded-concurrency wave shape is grounded on
//! `trickstertwo-toad/src/benchmarks/orchestrator.rs`'s
//! `Arc<Semaphore>` + `tokio::spawn` fan-out pattern.

mod queue;

pub use queue::{FetchRequest, fetch};

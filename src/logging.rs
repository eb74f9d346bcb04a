//! Structured logging bootstrap (SPEC_FULL.md §10.2).
//!
//! Mirrors `trickstertwo-toad/src/main.rs`'s
//! `tracing_subscriber::registry().with(fmt::layer()...).with(EnvFilter)`
//! pattern, adding a rolling-file sink via `tracing-appender` in place of the
//! reference implementation's `loguru.add(sink=..., rotation=..., level=...)`
//! (`original_source/app/utils.py::start_loguru`).

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

/// Installs the global tracing subscriber. The returned guard must be kept
/// alive for the process lifetime — dropping it stops the background flush
/// thread that `tracing-appender` spawns for the non-blocking writer.
pub fn init(cfg: &LoggingConfig) -> WorkerGuard {
    let sink_path = Path::new(&cfg.sink);
    let dir = sink_path.parent().filter(|p| !p.as_os_str().is_empty());
    let file_name = sink_path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| "contest_predictor.log".to_string());

    let rolling = match cfg.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(dir.unwrap_or(Path::new(".")), file_name),
        "never" => tracing_appender::rolling::never(dir.unwrap_or(Path::new(".")), file_name),
        _ => tracing_appender::rolling::daily(dir.unwrap_or(Path::new(".")), file_name),
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(rolling);

    let filter = EnvFilter::try_new(&cfg.level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    guard
}

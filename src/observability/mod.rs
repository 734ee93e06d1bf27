//! Structured logging and run metrics.
//!
//! This module provides:
//! - [`init_logging`] — One-time structured logging setup with `RUST_LOG` support
//! - [`RunMetrics`] — Per-run counters and phase timings
//! - [`PhaseTimer`] — Wall-clock timer that logs on completion

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "tracegraph=info";

/// Initialize structured logging with `RUST_LOG` environment variable support.
///
/// `fallback` is used when `RUST_LOG` is not set, then `tracegraph=info`.
/// Logs go to stderr so stdout stays clean for command output. Subsequent
/// calls are silently ignored.
pub fn init_logging(fallback: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Measures one pipeline phase.
pub struct PhaseTimer {
    phase: &'static str,
    started: Instant,
}

impl PhaseTimer {
    pub fn start(phase: &'static str) -> Self {
        Self {
            phase,
            started: Instant::now(),
        }
    }

    /// Stop the timer, log the phase, and return elapsed milliseconds.
    pub fn finish(self) -> u64 {
        let elapsed = duration_ms(self.started.elapsed());
        tracing::info!(phase = self.phase, elapsed_ms = elapsed, "phase complete");
        elapsed
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Counters and timings for one hierarchy run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunMetrics {
    pub types_loaded: usize,
    pub records_read: usize,
    pub items_normalized: usize,
    pub records_skipped: usize,
    pub duplicate_keys: usize,
    pub cycle_breaks: usize,
    pub descendants: usize,
    pub load_types_ms: u64,
    pub normalize_ms: u64,
    pub build_ms: u64,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "types_loaded": self.types_loaded,
            "records_read": self.records_read,
            "items_normalized": self.items_normalized,
            "records_skipped": self.records_skipped,
            "duplicate_keys": self.duplicate_keys,
            "cycle_breaks": self.cycle_breaks,
            "descendants": self.descendants,
            "load_types_ms": self.load_types_ms,
            "normalize_ms": self.normalize_ms,
            "build_ms": self.build_ms,
            "total_ms": self.total_ms(),
        })
    }

    pub fn total_ms(&self) -> u64 {
        self.load_types_ms + self.normalize_ms + self.build_ms
    }

    /// Fraction of read records that made it into the tree.
    pub fn coverage(&self) -> f64 {
        if self.records_read == 0 {
            return 0.0;
        }
        self.descendants as f64 / self.records_read as f64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

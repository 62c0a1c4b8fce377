//! Run statistics and summary rendering.
//!
//! `RunStats` is the only shared mutable state during the concurrent
//! phase; every field is an atomic counter. At the end of the run it is
//! frozen into a `RunSummary` for rendering and optional notification.

use crate::error::NotifyError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Shared counters, updated from worker threads via atomic increments
#[derive(Debug, Default)]
pub struct RunStats {
    total_processed: AtomicUsize,
    duplicates_found: AtomicUsize,
    unused_found: AtomicUsize,
    invalid_found: AtomicUsize,
    size_skipped: AtomicUsize,
    moved: AtomicUsize,
    deleted: AtomicUsize,
    planned: AtomicUsize,
    errors: AtomicUsize,
    freed_bytes: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&self) {
        self.total_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unused(&self) {
        self.unused_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid(&self) {
        self.invalid_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_size_skipped(&self) {
        self.size_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_moved(&self, bytes: u64) {
        self.moved.fetch_add(1, Ordering::Relaxed);
        self.freed_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_deleted(&self, bytes: u64) {
        self.deleted.fetch_add(1, Ordering::Relaxed);
        self.freed_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_planned(&self) {
        self.planned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Freeze the counters into an immutable summary
    pub fn snapshot(&self, dry_run: bool, duration_ms: u64) -> RunSummary {
        RunSummary {
            total_processed: self.total_processed.load(Ordering::Relaxed),
            duplicates_found: self.duplicates_found.load(Ordering::Relaxed),
            unused_found: self.unused_found.load(Ordering::Relaxed),
            invalid_found: self.invalid_found.load(Ordering::Relaxed),
            size_skipped: self.size_skipped.load(Ordering::Relaxed),
            moved: self.moved.load(Ordering::Relaxed),
            deleted: self.deleted.load(Ordering::Relaxed),
            planned: self.planned.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            freed_bytes: self.freed_bytes.load(Ordering::Relaxed),
            dry_run,
            duration_ms,
            finished_at: Utc::now(),
        }
    }
}

/// Immutable end-of-run summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_processed: usize,
    pub duplicates_found: usize,
    pub unused_found: usize,
    pub invalid_found: usize,
    pub size_skipped: usize,
    pub moved: usize,
    pub deleted: usize,
    /// Actions that a dry run would have taken
    pub planned: usize,
    pub errors: usize,
    /// Bytes actually freed (0 in dry-run mode)
    pub freed_bytes: u64,
    pub dry_run: bool,
    pub duration_ms: u64,
    /// Wall-clock completion time
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Render the human-readable report
    pub fn render(&self) -> String {
        let mut out = String::new();

        let headline = if self.dry_run {
            "Sweep complete (SIMULATION - no files were touched)"
        } else {
            "Sweep complete"
        };
        out.push_str(headline);
        out.push('\n');

        out.push_str(&format!(
            "  {} files processed in {:.1}s\n",
            self.total_processed,
            self.duration_ms as f64 / 1000.0
        ));
        out.push_str(&format!(
            "  {} duplicates, {} unused\n",
            self.duplicates_found, self.unused_found
        ));
        out.push_str(&format!(
            "  {} invalid, {} outside size bounds (left for manual review)\n",
            self.invalid_found, self.size_skipped
        ));

        if self.dry_run {
            out.push_str(&format!("  {} actions planned\n", self.planned));
        } else {
            out.push_str(&format!(
                "  {} moved to quarantine, {} deleted, {} freed\n",
                self.moved,
                self.deleted,
                format_bytes(self.freed_bytes)
            ));
        }

        // Operators decide whether to re-run based on this line
        if self.errors == 0 {
            out.push_str("  0 errors\n");
        } else {
            out.push_str(&format!(
                "  {} errors - see the log for affected paths\n",
                self.errors
            ));
        }

        out
    }

    /// Render as JSON for scripting
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// External notification collaborator, e.g. an email or chat hook.
///
/// The engine only ever hands it the rendered summary.
pub trait Notifier: Send + Sync {
    fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Humanize a byte count
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

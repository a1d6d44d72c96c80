//! Global atomic counters for run observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Counters::flush`] to emit current values as a single `info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global counters singleton.
pub static METRICS: Counters = Counters::new();

/// Process-wide atomic counters.
pub struct Counters {
    repos_processed: AtomicU64,
    commits_classified: AtomicU64,
    check_run_requests: AtomicU64,
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}

impl Counters {
    pub const fn new() -> Self {
        Self {
            repos_processed: AtomicU64::new(0),
            commits_classified: AtomicU64::new(0),
            check_run_requests: AtomicU64::new(0),
        }
    }

    pub fn inc_repos_processed(&self) {
        self.repos_processed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "repos_processed", "counter incremented");
    }

    pub fn add_commits_classified(&self, n: u64) {
        self.commits_classified.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "commits_classified", n, "counter incremented");
    }

    pub fn inc_check_run_requests(&self) {
        self.check_run_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            repos_processed = self.repos_processed(),
            commits_classified = self.commits_classified(),
            check_run_requests = self.check_run_requests(),
        );
    }

    pub fn repos_processed(&self) -> u64 {
        self.repos_processed.load(Ordering::Relaxed)
    }

    pub fn commits_classified(&self) -> u64 {
        self.commits_classified.load(Ordering::Relaxed)
    }

    pub fn check_run_requests(&self) -> u64 {
        self.check_run_requests.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.repos_processed.store(0, Ordering::Relaxed);
        self.commits_classified.store(0, Ordering::Relaxed);
        self.check_run_requests.store(0, Ordering::Relaxed);
    }
}

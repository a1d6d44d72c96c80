//! Structured observability hooks for metrics runs.
//!
//! - Run-scoped tracing spans via the [`RunSpan`] RAII guard
//! - Emission functions for run and repository lifecycle events
//!
//! Events are emitted at `info!` level unless noted; filter with `RUST_LOG`.

use tracing::info;

use crate::rollup::RepositoryMetrics;

/// RAII guard that enters a run-scoped tracing span.
///
/// ```ignore
/// let _span = RunSpan::enter("5f0c…");
/// // every event emitted on this thread now carries run_id
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(run_id: &str) -> Self {
        Self {
            _span: Self::span(run_id).entered(),
        }
    }

    /// The un-entered span, for instrumenting futures.
    pub fn span(run_id: &str) -> tracing::Span {
        tracing::info_span!("fourkeys.run", run_id = %run_id)
    }
}

/// Emit event: run started.
pub fn emit_run_started(run_id: &str, teams: usize, repos: usize, lookback_days: u32) {
    info!(
        event = "run.started",
        run_id = %run_id,
        teams = teams,
        repos = repos,
        lookback_days = lookback_days,
    );
}

/// Emit event: one repository's metrics were computed (debug level).
pub fn emit_repo_completed(team: &str, metrics: &RepositoryMetrics) {
    tracing::debug!(
        event = "repo.completed",
        team = %team,
        repo = %metrics.repo,
        merged_changes = metrics.merged_change_count,
        delivered_changes = metrics.delivered_change_count(),
        deployments = metrics.deployment_count,
        mean_lead_time_ms = metrics.mean_lead_time_millis(),
        mean_deployment_gap_ms = metrics.mean_deployment_gap_millis(),
    );
}

/// Emit event: run finished.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, repos: usize) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        repos = repos,
    );
}

/// Emit event: run aborted (warning level).
pub fn emit_run_failed(run_id: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "run.failed", run_id = %run_id, error = %error);
}

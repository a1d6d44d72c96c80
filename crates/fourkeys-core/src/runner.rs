//! Concurrent metrics run across every repository of every team.
//!
//! One task per (team, repo) is spawned on a [`JoinSet`]. Inside a task the
//! merged-changes fetch and the deployed-commits fetch are joined before any
//! correlation happens. The collector loop is the only writer of the
//! [`TeamRollup`] and doubles as the barrier: the report is built only after
//! every task has been folded in. The first failure aborts the run.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt};
use tokio::task::JoinSet;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::MetricsConfig;
use crate::delivery::classify;
use crate::domain::{DeployedCommit, FourKeysError, Result};
use crate::metrics::METRICS;
use crate::obs::{
    emit_repo_completed, emit_run_failed, emit_run_finished, emit_run_started, RunSpan,
};
use crate::report::{MetricsReport, TeamReport};
use crate::rollup::{RepositoryMetrics, TeamRollup};
use crate::source::{DeliverySource, SourceError, SourceResult};
use crate::window::LookbackWindow;

/// Runs the full fetch → classify → match → aggregate pipeline.
pub struct MetricsRunner {
    source: Arc<dyn DeliverySource>,
    config: MetricsConfig,
}

impl MetricsRunner {
    pub fn new(source: Arc<dyn DeliverySource>, config: MetricsConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Compute per-team metrics for the window ending at `now`.
    ///
    /// All repository fetches run concurrently. Any fetch failure fails the
    /// whole run; no partial report is produced.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<MetricsReport> {
        self.config.validate()?;

        let run_id = Uuid::new_v4().to_string();
        let window = LookbackWindow::ending_at(now, self.config.lookback_days);
        let started = Instant::now();

        let outcome = self
            .collect(&run_id, window)
            .instrument(RunSpan::span(&run_id))
            .await
            .and_then(|rollup| {
                let repos = rollup.reported_count();
                rollup.finish().map(|teams| (repos, teams))
            });

        self.finalize(run_id, now, window, started, outcome)
    }

    /// Build the report once the barrier has been passed.
    fn finalize(
        &self,
        run_id: String,
        now: DateTime<Utc>,
        window: LookbackWindow,
        started: Instant,
        outcome: Result<(usize, Vec<TeamReport>)>,
    ) -> Result<MetricsReport> {
        let _span = RunSpan::enter(&run_id);
        match outcome {
            Ok((repos, teams)) => {
                emit_run_finished(&run_id, started.elapsed().as_millis() as u64, repos);
                METRICS.flush();
                Ok(MetricsReport {
                    run_id,
                    generated_at: now,
                    owner: self.config.owner.clone(),
                    lookback_days: self.config.lookback_days,
                    window_start: window.start(),
                    teams,
                })
            }
            Err(e) => {
                emit_run_failed(&run_id, &e);
                Err(e)
            }
        }
    }

    async fn collect(&self, run_id: &str, window: LookbackWindow) -> Result<TeamRollup> {
        emit_run_started(
            run_id,
            self.config.teams.len(),
            self.config.repo_count(),
            self.config.lookback_days,
        );

        let mut join_set = JoinSet::new();
        for team in &self.config.teams {
            for repo in &team.repos {
                let source = Arc::clone(&self.source);
                let team_name = team.name.clone();
                let repo = repo.clone();
                let check_name = self.config.deployment_check_name.clone();
                let max_in_flight = self.config.max_concurrent_requests;
                let span = tracing::debug_span!("repo", team = %team_name, repo = %repo);
                join_set.spawn(
                    async move {
                        let metrics = repository_metrics(
                            source.as_ref(),
                            &repo,
                            &window,
                            &check_name,
                            max_in_flight,
                        )
                        .await?;
                        Ok::<(String, RepositoryMetrics), FourKeysError>((team_name, metrics))
                    }
                    .instrument(span),
                );
            }
        }

        // Returning early drops the set, which aborts the outstanding fetches.
        let mut rollup = TeamRollup::from_config(&self.config.teams);
        while let Some(joined) = join_set.join_next().await {
            let (team, metrics) =
                joined.map_err(|e| FourKeysError::TaskJoin(format!("repo task join error: {e}")))??;
            emit_repo_completed(&team, &metrics);
            METRICS.inc_repos_processed();
            rollup.record(&team, metrics)?;
        }
        Ok(rollup)
    }
}

/// Fetch and correlate one repository's data.
pub async fn repository_metrics(
    source: &dyn DeliverySource,
    repo: &str,
    window: &LookbackWindow,
    deployment_check_name: &str,
    max_in_flight: usize,
) -> Result<RepositoryMetrics> {
    let (changes, deployed) = tokio::try_join!(
        source.merged_changes(repo, window),
        deployed_commits(
            source,
            repo,
            window.start(),
            deployment_check_name,
            max_in_flight
        ),
    )
    .map_err(|source| FourKeysError::Fetch {
        repo: repo.to_string(),
        source,
    })?;

    Ok(RepositoryMetrics::compute(repo, &changes, &deployed))
}

/// List commits since `since` and classify each from its check runs.
///
/// At most `max_in_flight` check-run requests run at once; the newest-first
/// order of the commit listing is preserved.
pub async fn deployed_commits(
    source: &dyn DeliverySource,
    repo: &str,
    since: DateTime<Utc>,
    deployment_check_name: &str,
    max_in_flight: usize,
) -> SourceResult<Vec<DeployedCommit>> {
    let commits = source.commits_since(repo, since).await?;
    METRICS.add_commits_classified(commits.len() as u64);

    futures::stream::iter(commits)
        .map(|commit| async move {
            METRICS.inc_check_run_requests();
            let runs = source.check_runs(repo, &commit.sha).await?;
            Ok::<DeployedCommit, SourceError>(classify(commit, &runs, deployment_check_name))
        })
        .buffered(max_in_flight.max(1))
        .try_collect()
        .await
}

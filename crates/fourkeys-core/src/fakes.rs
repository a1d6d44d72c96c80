//! In-memory fakes for the data-source trait (testing only)
//!
//! [`MemoryDeliverySource`] satisfies the [`DeliverySource`] contract without
//! any network access: records are seeded up front, per-repo failures can be
//! injected, and an optional latency exercises the concurrent paths.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::DEFAULT_BASELINE_BRANCH;
use crate::domain::{CheckRun, Commit, MergedChange, PullRequestRecord};
use crate::source::{DeliverySource, SourceError, SourceResult};
use crate::window::{select_merged_changes, LookbackWindow};

#[derive(Debug, Default)]
struct RepoData {
    pull_requests: Vec<PullRequestRecord>,
    commits: Vec<Commit>,
    check_runs: HashMap<String, Vec<CheckRun>>,
    failure: Option<SourceError>,
}

/// In-memory data source keyed by repository name.
#[derive(Debug)]
pub struct MemoryDeliverySource {
    repos: Mutex<HashMap<String, RepoData>>,
    baseline_branch: String,
    latency: Option<Duration>,
}

impl Default for MemoryDeliverySource {
    fn default() -> Self {
        Self {
            repos: Mutex::new(HashMap::new()),
            baseline_branch: DEFAULT_BASELINE_BRANCH.to_string(),
            latency: None,
        }
    }
}

impl MemoryDeliverySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_baseline_branch(mut self, branch: impl Into<String>) -> Self {
        self.baseline_branch = branch.into();
        self
    }

    /// Seed a raw change-request record.
    pub fn add_pull_request(&self, repo: &str, record: PullRequestRecord) {
        let mut repos = self.repos.lock().unwrap();
        repos
            .entry(repo.to_string())
            .or_default()
            .pull_requests
            .push(record);
    }

    /// Seed a closed request merged into the baseline branch.
    pub fn add_merged_change(&self, repo: &str, merge_commit_sha: &str, merged_at: DateTime<Utc>) {
        let record = PullRequestRecord {
            merge_commit_sha: Some(merge_commit_sha.to_string()),
            merged_at: Some(merged_at),
            base_branch: self.baseline_branch.clone(),
            state: "closed".to_string(),
        };
        self.add_pull_request(repo, record);
    }

    /// Seed a commit and the check runs reported for it.
    pub fn add_commit(&self, repo: &str, commit: Commit, check_runs: Vec<CheckRun>) {
        let mut repos = self.repos.lock().unwrap();
        let data = repos.entry(repo.to_string()).or_default();
        data.check_runs.insert(commit.sha.clone(), check_runs);
        data.commits.push(commit);
    }

    /// Make every call for `repo` fail with `error`.
    pub fn fail_repo(&self, repo: &str, error: SourceError) {
        let mut repos = self.repos.lock().unwrap();
        repos.entry(repo.to_string()).or_default().failure = Some(error);
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn failure(&self, repo: &str) -> Option<SourceError> {
        let repos = self.repos.lock().unwrap();
        repos.get(repo).and_then(|d| d.failure.clone())
    }
}

#[async_trait]
impl DeliverySource for MemoryDeliverySource {
    async fn merged_changes(
        &self,
        repo: &str,
        window: &LookbackWindow,
    ) -> SourceResult<Vec<MergedChange>> {
        self.pause().await;
        if let Some(err) = self.failure(repo) {
            return Err(err);
        }
        let repos = self.repos.lock().unwrap();
        let records = repos
            .get(repo)
            .map(|d| d.pull_requests.as_slice())
            .unwrap_or_default();
        Ok(select_merged_changes(records, window, &self.baseline_branch))
    }

    async fn commits_since(&self, repo: &str, since: DateTime<Utc>) -> SourceResult<Vec<Commit>> {
        self.pause().await;
        if let Some(err) = self.failure(repo) {
            return Err(err);
        }
        let repos = self.repos.lock().unwrap();
        let mut commits: Vec<Commit> = repos
            .get(repo)
            .map(|d| {
                d.commits
                    .iter()
                    .filter(|c| c.commit_date >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // Newest first, like the hosted APIs; equal dates keep seeding order.
        commits.sort_by(|a, b| b.commit_date.cmp(&a.commit_date));
        Ok(commits)
    }

    async fn check_runs(&self, repo: &str, sha: &str) -> SourceResult<Vec<CheckRun>> {
        self.pause().await;
        if let Some(err) = self.failure(repo) {
            return Err(err);
        }
        let repos = self.repos.lock().unwrap();
        Ok(repos
            .get(repo)
            .and_then(|d| d.check_runs.get(sha).cloned())
            .unwrap_or_default())
    }
}

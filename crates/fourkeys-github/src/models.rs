//! Wire payloads for the GitHub REST endpoints and their domain conversions.
//!
//! Only the fields the metrics need are decoded; everything else in the
//! response is ignored.

use chrono::{DateTime, Utc};
use fourkeys_core::{CheckConclusion, CheckRun, Commit, PullRequestRecord};
use serde::Deserialize;

/// Item of `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
    pub state: String,
    pub merge_commit_sha: Option<String>,
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub base: BranchRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub name: String,
}

impl From<PullRequestPayload> for PullRequestRecord {
    fn from(pr: PullRequestPayload) -> Self {
        PullRequestRecord {
            merge_commit_sha: pr.merge_commit_sha,
            merged_at: pr.merged_at,
            base_branch: pr.base.name,
            state: pr.state,
        }
    }
}

/// Item of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitPayload {
    pub sha: String,
    pub commit: CommitDetail,
    #[serde(default)]
    pub parents: Vec<ShaRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub tree: ShaRef,
    pub committer: Signature,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShaRef {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Signature {
    pub date: DateTime<Utc>,
}

impl From<CommitPayload> for Commit {
    fn from(c: CommitPayload) -> Self {
        Commit::new(c.sha, c.commit.committer.date)
            .with_tree(c.commit.tree.sha)
            .with_parents(c.parents.into_iter().map(|p| p.sha).collect())
    }
}

/// Body of `GET /repos/{owner}/{repo}/commits/{ref}/check-runs`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRunsPayload {
    pub total_count: u64,
    pub check_runs: Vec<CheckRunPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckRunPayload {
    pub name: String,
    pub status: Option<String>,
    pub conclusion: Option<CheckConclusion>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<CheckRunPayload> for CheckRun {
    fn from(run: CheckRunPayload) -> Self {
        CheckRun {
            name: run.name,
            status: run.status,
            conclusion: run.conclusion,
            completed_at: run.completed_at,
        }
    }
}

/// Error body GitHub attaches to 4xx/5xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorPayload {
    pub message: String,
}

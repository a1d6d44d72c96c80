//! Commits, check runs and the deployment marker derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point in a repository's history, as returned by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit id.
    pub sha: String,
    /// Tree the commit points at.
    pub tree_sha: String,
    /// Committer date; the authoritative ordering key.
    pub commit_date: DateTime<Utc>,
    /// Parent shas in source order.
    pub parents: Vec<String>,
}

impl Commit {
    pub fn new(sha: impl Into<String>, commit_date: DateTime<Utc>) -> Self {
        Self {
            sha: sha.into(),
            tree_sha: String::new(),
            commit_date,
            parents: Vec::new(),
        }
    }

    /// Set the parent shas.
    pub fn with_parents(mut self, parents: Vec<String>) -> Self {
        self.parents = parents;
        self
    }

    /// Set the tree sha.
    pub fn with_tree(mut self, tree_sha: impl Into<String>) -> Self {
        self.tree_sha = tree_sha.into();
        self
    }
}

/// Conclusion of a completed check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Stale,
    #[serde(other)]
    Unknown,
}

/// A named status check evaluated against a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    /// Check name, e.g. the deployment pipeline's name.
    pub name: String,
    /// Lifecycle status (`queued`, `in_progress`, `completed`).
    #[serde(default)]
    pub status: Option<String>,
    /// Outcome; absent while the run is still in flight.
    #[serde(default)]
    pub conclusion: Option<CheckConclusion>,
    /// Completion time; absent while the run is still in flight.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CheckRun {
    /// A completed run with the given conclusion.
    pub fn completed(
        name: impl Into<String>,
        conclusion: CheckConclusion,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            status: Some("completed".to_string()),
            conclusion: Some(conclusion),
            completed_at: Some(completed_at),
        }
    }

    /// A run that has not finished yet.
    pub fn in_progress(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: Some("in_progress".to_string()),
            conclusion: None,
            completed_at: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.conclusion == Some(CheckConclusion::Success)
    }
}

/// A commit labelled with when (if ever) it was deployed.
///
/// Produced once per commit fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedCommit {
    #[serde(flatten)]
    pub commit: Commit,
    /// Completion time of the successful deployment check, if any.
    pub deployed_at: Option<DateTime<Utc>>,
}

impl DeployedCommit {
    pub fn new(commit: Commit, deployed_at: Option<DateTime<Utc>>) -> Self {
        Self {
            commit,
            deployed_at,
        }
    }

    pub fn sha(&self) -> &str {
        &self.commit.sha
    }

    pub fn is_deployed(&self) -> bool {
        self.deployed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("valid RFC3339")
            .with_timezone(&Utc)
    }

    #[test]
    fn test_check_conclusion_deserializes_github_values() {
        let c: CheckConclusion = serde_json::from_str("\"timed_out\"").unwrap();
        assert_eq!(c, CheckConclusion::TimedOut);
        let c: CheckConclusion = serde_json::from_str("\"action_required\"").unwrap();
        assert_eq!(c, CheckConclusion::ActionRequired);
    }

    #[test]
    fn test_unrecognised_conclusion_maps_to_unknown() {
        let c: CheckConclusion = serde_json::from_str("\"startup_failure\"").unwrap();
        assert_eq!(c, CheckConclusion::Unknown);
    }

    #[test]
    fn test_check_run_without_conclusion_parses() {
        let run: CheckRun =
            serde_json::from_str(r#"{"name":"Jenkins","status":"in_progress","conclusion":null,"completed_at":null}"#)
                .unwrap();
        assert_eq!(run.name, "Jenkins");
        assert!(run.conclusion.is_none());
        assert!(!run.succeeded());
    }

    #[test]
    fn test_deployed_commit_flattens_commit_fields() {
        let dc = DeployedCommit::new(
            Commit::new("abc", ts("2024-03-01T10:00:00Z")).with_tree("t1"),
            Some(ts("2024-03-01T11:00:00Z")),
        );
        let v = serde_json::to_value(&dc).unwrap();
        assert_eq!(v["sha"], "abc");
        assert_eq!(v["tree_sha"], "t1");
        assert!(v["deployed_at"].is_string());
        assert!(dc.is_deployed());
    }
}

//! Change requests and the measurements derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A change request as reported by the data source, before filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    /// Sha of the integration commit; absent for unmerged requests.
    pub merge_commit_sha: Option<String>,
    /// Merge time; absent for unmerged requests.
    pub merged_at: Option<DateTime<Utc>>,
    /// Branch the request targets.
    pub base_branch: String,
    /// Request state (`open` / `closed`).
    pub state: String,
}

/// A closed-and-merged change request inside the lookback window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedChange {
    pub merge_commit_sha: String,
    pub merged_at: DateTime<Utc>,
}

impl MergedChange {
    pub fn new(merge_commit_sha: impl Into<String>, merged_at: DateTime<Utc>) -> Self {
        Self {
            merge_commit_sha: merge_commit_sha.into(),
            merged_at,
        }
    }

    /// Build from a raw record; `None` unless both the sha and merge time are present.
    pub fn from_record(record: &PullRequestRecord) -> Option<Self> {
        match (&record.merge_commit_sha, record.merged_at) {
            (Some(sha), Some(merged_at)) => Some(Self::new(sha.clone(), merged_at)),
            _ => None,
        }
    }
}

/// Merge-to-deploy duration for one change that was found deployed.
///
/// Negative when the deployment check reports a completion earlier than the
/// merge (clock skew); the value is kept as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTimeSample {
    pub merge_commit_sha: String,
    pub duration_millis: i64,
}

/// Time between two chronologically adjacent deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentGap {
    pub duration_millis: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_record_requires_merge_time_and_sha() {
        let merged_at = Utc::now();
        let mut record = PullRequestRecord {
            merge_commit_sha: Some("abc".to_string()),
            merged_at: None,
            base_branch: "master".to_string(),
            state: "closed".to_string(),
        };
        assert!(MergedChange::from_record(&record).is_none());

        record.merged_at = Some(merged_at);
        let change = MergedChange::from_record(&record).expect("merged");
        assert_eq!(change.merge_commit_sha, "abc");
        assert_eq!(change.merged_at, merged_at);

        record.merge_commit_sha = None;
        assert!(MergedChange::from_record(&record).is_none());
    }
}

//! Metrics for a single repository.

use serde::{Deserialize, Serialize};

use crate::delivery::{deployed_only, deployment_gaps, lead_time_samples, mean_millis};
use crate::domain::{DeployedCommit, MergedChange};

/// Everything one repository contributes to its team's totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMetrics {
    pub repo: String,
    /// Merged changes inside the window (delivered or not).
    pub merged_change_count: usize,
    /// Lead times of the delivered changes, in change order.
    pub lead_times: Vec<i64>,
    /// Commits carrying a successful deployment check.
    pub deployment_count: usize,
    /// Gaps between adjacent deployments, newest first.
    pub deployment_gaps: Vec<i64>,
}

impl RepositoryMetrics {
    /// Correlate `changes` with `deployed` (newest-first) for `repo`.
    pub fn compute(
        repo: impl Into<String>,
        changes: &[MergedChange],
        deployed: &[DeployedCommit],
    ) -> Self {
        let lead_times = lead_time_samples(changes, deployed)
            .into_iter()
            .map(|s| s.duration_millis)
            .collect();
        let deployment_gaps = deployment_gaps(deployed)
            .into_iter()
            .map(|g| g.duration_millis)
            .collect();

        Self {
            repo: repo.into(),
            merged_change_count: changes.len(),
            lead_times,
            deployment_count: deployed_only(deployed).len(),
            deployment_gaps,
        }
    }

    pub fn delivered_change_count(&self) -> usize {
        self.lead_times.len()
    }

    pub fn mean_lead_time_millis(&self) -> f64 {
        mean_millis(&self.lead_times)
    }

    pub fn mean_deployment_gap_millis(&self) -> f64 {
        mean_millis(&self.deployment_gaps)
    }
}

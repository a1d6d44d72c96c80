//! Deployment frequency: gaps between adjacent deployments.

use crate::delivery::lead_time::mean_millis;
use crate::domain::{DeployedCommit, DeploymentGap};

/// The deployed subset of `commits`, relative order preserved.
pub fn deployed_only(commits: &[DeployedCommit]) -> Vec<&DeployedCommit> {
    commits.iter().filter(|c| c.is_deployed()).collect()
}

/// Gaps between each adjacent pair of deployed commits.
///
/// Gaps are taken between neighbours of the deployed-only sequence, never
/// against undeployed commits, and are always non-negative whatever order the
/// source used.
pub fn deployment_gaps(commits: &[DeployedCommit]) -> Vec<DeploymentGap> {
    let times: Vec<_> = commits.iter().filter_map(|c| c.deployed_at).collect();
    times
        .windows(2)
        .map(|pair| DeploymentGap {
            duration_millis: (pair[0] - pair[1]).num_milliseconds().abs(),
        })
        .collect()
}

/// Mean gap in milliseconds; `0.0` with fewer than two deployments.
pub fn mean_gap_millis(commits: &[DeployedCommit]) -> f64 {
    let gaps: Vec<i64> = deployment_gaps(commits)
        .iter()
        .map(|g| g.duration_millis)
        .collect();
    mean_millis(&gaps)
}

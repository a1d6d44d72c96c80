//! Deployment matching for merge commits.
//!
//! Deployments bundle commits: a merge is delivered by the first deployment at
//! or after its integration commit, even when that commit carries no
//! deployment marker of its own. The deployed-commit sequence arrives
//! newest-first, so the scan walks it from the tail (oldest) towards the head.
//!
//! The scan is a two-state machine:
//!
//! | state                | entry                          | next                      |
//! |----------------------|--------------------------------|---------------------------|
//! | `Searching`          | target sha, deployed           | resolved (entry time)     |
//! | `Searching`          | target sha, not deployed       | `FoundPendingDeploy`      |
//! | `Searching`          | other                          | `Searching`               |
//! | `FoundPendingDeploy` | any deployed entry             | resolved (entry time)     |
//! | `FoundPendingDeploy` | not deployed                   | `FoundPendingDeploy`      |
//!
//! Exhausting the sequence without resolution means "not deployed".

use chrono::{DateTime, Utc};

use crate::domain::DeployedCommit;

/// Scan state while looking for a target sha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// The target sha has not been seen yet.
    Searching,
    /// The target was seen without a deployment; the next deployed entry delivers it.
    FoundPendingDeploy,
}

/// Outcome of feeding one entry to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStep {
    Continue(MatchState),
    Resolved(DateTime<Utc>),
}

/// Transition function: pure, independent of how the sequence is obtained.
pub fn step(state: MatchState, entry: &DeployedCommit, target_sha: &str) -> MatchStep {
    let is_target = entry.sha() == target_sha;
    match (state, is_target, entry.deployed_at) {
        (_, true, Some(at)) => MatchStep::Resolved(at),
        (MatchState::FoundPendingDeploy, false, Some(at)) => MatchStep::Resolved(at),
        (_, true, None) => MatchStep::Continue(MatchState::FoundPendingDeploy),
        (state, false, _) => MatchStep::Continue(state),
    }
}

/// Find the deployment time that first delivered `target_sha`.
///
/// `deployed` must be in the data source's newest-first order. Duplicate shas
/// are not collapsed; the first structural match in scan order wins.
pub fn find_deployment_time(
    target_sha: &str,
    deployed: &[DeployedCommit],
) -> Option<DateTime<Utc>> {
    let mut state = MatchState::Searching;
    for entry in deployed.iter().rev() {
        match step(state, entry, target_sha) {
            MatchStep::Resolved(at) => return Some(at),
            MatchStep::Continue(next) => state = next,
        }
    }
    None
}

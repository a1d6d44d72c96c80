//! Lookback window: which merges and deployments a run considers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{MergedChange, PullRequestRecord};

/// Trailing time range a metrics run covers. The start is exclusive for merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookbackWindow {
    start: DateTime<Utc>,
    lookback_days: u32,
}

impl LookbackWindow {
    /// Window covering exactly the `lookback_days` before `now`.
    pub fn ending_at(now: DateTime<Utc>, lookback_days: u32) -> Self {
        let start = now - Duration::days(i64::from(lookback_days));
        Self {
            start,
            lookback_days,
        }
    }

    /// Window with an explicit start instant, no truncation.
    pub fn new(start: DateTime<Utc>, lookback_days: u32) -> Self {
        Self {
            start,
            lookback_days,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// Whether a change merged at `merged_at` falls inside the window.
    ///
    /// Unmerged changes (`None`) are never admitted; a merge exactly at the
    /// window start is excluded.
    pub fn admits(&self, merged_at: Option<DateTime<Utc>>) -> bool {
        matches!(merged_at, Some(t) if t > self.start)
    }
}

/// Keep closed records targeting `baseline_branch` that were merged inside the window.
pub fn select_merged_changes(
    records: &[PullRequestRecord],
    window: &LookbackWindow,
    baseline_branch: &str,
) -> Vec<MergedChange> {
    records
        .iter()
        .filter(|r| r.state == "closed" && r.base_branch == baseline_branch)
        .filter(|r| window.admits(r.merged_at))
        .filter_map(MergedChange::from_record)
        .collect()
}

//! Lead time for changes: merge → first delivering deployment.

use crate::delivery::matcher::find_deployment_time;
use crate::domain::{DeployedCommit, LeadTimeSample, MergedChange};

/// One sample per merged change that a deployment delivered, in change order.
///
/// Changes with no matching deployment produce no sample.
pub fn lead_time_samples(
    changes: &[MergedChange],
    deployed: &[DeployedCommit],
) -> Vec<LeadTimeSample> {
    changes
        .iter()
        .filter_map(|change| {
            let deployed_at = find_deployment_time(&change.merge_commit_sha, deployed)?;
            let duration_millis = (deployed_at - change.merged_at).num_milliseconds();
            if duration_millis < 0 {
                tracing::warn!(
                    sha = %change.merge_commit_sha,
                    duration_ms = duration_millis,
                    "deployment completed before merge; keeping negative lead time"
                );
            }
            Some(LeadTimeSample {
                merge_commit_sha: change.merge_commit_sha.clone(),
                duration_millis,
            })
        })
        .collect()
}

/// Arithmetic mean of `durations` in milliseconds; `0.0` when empty.
///
/// The sum is exact, so the result does not depend on sample order.
pub fn mean_millis(durations: &[i64]) -> f64 {
    if durations.is_empty() {
        return 0.0;
    }
    let sum: i128 = durations.iter().map(|&d| i128::from(d)).sum();
    sum as f64 / durations.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Commit;
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("valid RFC3339")
            .with_timezone(&Utc)
    }

    fn deployed(sha: &str, at: Option<&str>) -> DeployedCommit {
        DeployedCommit::new(Commit::new(sha, ts("2024-01-01T00:00:00Z")), at.map(ts))
    }

    #[test]
    fn test_mean_of_empty_is_zero() {
        assert_eq!(mean_millis(&[]), 0.0);
    }

    #[test]
    fn test_mean_of_two_samples() {
        assert_eq!(mean_millis(&[1000, 3000]), 2000.0);
    }

    #[test]
    fn test_mean_does_not_overflow() {
        assert_eq!(mean_millis(&[i64::MAX, i64::MAX]), i64::MAX as f64);
    }

    #[test]
    fn test_samples_skip_undelivered_changes() {
        let seq = vec![
            deployed("m2", None),
            deployed("m1", Some("2024-01-01T12:00:00Z")),
        ];
        let changes = vec![
            MergedChange::new("m1", ts("2024-01-01T10:00:00Z")),
            MergedChange::new("m2", ts("2024-01-01T13:00:00Z")),
            MergedChange::new("missing", ts("2024-01-01T13:00:00Z")),
        ];
        let samples = lead_time_samples(&changes, &seq);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].merge_commit_sha, "m1");
        assert_eq!(samples[0].duration_millis, 2 * 60 * 60 * 1000);
    }

    #[test]
    fn test_clock_skew_yields_negative_sample() {
        let seq = vec![deployed("m1", Some("2024-01-01T09:59:59Z"))];
        let changes = vec![MergedChange::new("m1", ts("2024-01-01T10:00:00Z"))];
        let samples = lead_time_samples(&changes, &seq);
        assert_eq!(samples[0].duration_millis, -1000);
    }
}

//! Commit deployment classification.

use crate::domain::{CheckRun, Commit, DeployedCommit};

/// Label `commit` with the time it was deployed, if ever.
///
/// Only the first run named `deployment_check_name` is considered; later runs
/// with the same name are ignored even when the first one did not succeed.
pub fn classify(
    commit: Commit,
    check_runs: &[CheckRun],
    deployment_check_name: &str,
) -> DeployedCommit {
    let deployed_at = check_runs
        .iter()
        .find(|run| run.name == deployment_check_name)
        .filter(|run| run.succeeded())
        .and_then(|run| {
            if run.completed_at.is_none() {
                tracing::debug!(
                    sha = %commit.sha,
                    check = %deployment_check_name,
                    "successful deployment check has no completion time"
                );
            }
            run.completed_at
        });

    DeployedCommit::new(commit, deployed_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CheckConclusion;
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("valid RFC3339")
            .with_timezone(&Utc)
    }

    fn commit() -> Commit {
        Commit::new("c1", ts("2024-05-01T09:00:00Z"))
    }

    #[test]
    fn test_successful_named_check_marks_deployed() {
        let runs = vec![
            CheckRun::completed("lint", CheckConclusion::Success, ts("2024-05-01T09:01:00Z")),
            CheckRun::completed("Jenkins", CheckConclusion::Success, ts("2024-05-01T09:30:00Z")),
        ];
        let dc = classify(commit(), &runs, "Jenkins");
        assert_eq!(dc.deployed_at, Some(ts("2024-05-01T09:30:00Z")));
    }

    #[test]
    fn test_failed_check_is_not_deployed() {
        let runs = vec![CheckRun::completed(
            "Jenkins",
            CheckConclusion::Failure,
            ts("2024-05-01T09:30:00Z"),
        )];
        assert!(!classify(commit(), &runs, "Jenkins").is_deployed());
    }

    #[test]
    fn test_first_matching_run_wins_without_fallback() {
        let runs = vec![
            CheckRun::completed("Jenkins", CheckConclusion::Failure, ts("2024-05-01T09:10:00Z")),
            CheckRun::completed("Jenkins", CheckConclusion::Success, ts("2024-05-01T09:20:00Z")),
        ];
        assert!(classify(commit(), &runs, "Jenkins").deployed_at.is_none());
    }

    #[test]
    fn test_first_of_two_successes_is_used() {
        let runs = vec![
            CheckRun::completed("Jenkins", CheckConclusion::Success, ts("2024-05-01T09:10:00Z")),
            CheckRun::completed("Jenkins", CheckConclusion::Success, ts("2024-05-01T09:20:00Z")),
        ];
        assert_eq!(
            classify(commit(), &runs, "Jenkins").deployed_at,
            Some(ts("2024-05-01T09:10:00Z"))
        );
    }

    #[test]
    fn test_no_matching_check_or_no_checks() {
        let runs = vec![CheckRun::completed(
            "jenkins",
            CheckConclusion::Success,
            ts("2024-05-01T09:10:00Z"),
        )];
        assert!(!classify(commit(), &runs, "Jenkins").is_deployed());
        assert!(!classify(commit(), &[], "Jenkins").is_deployed());
    }

    #[test]
    fn test_in_progress_check_is_not_deployed() {
        let runs = vec![CheckRun::in_progress("Jenkins")];
        assert!(!classify(commit(), &runs, "Jenkins").is_deployed());
    }

    #[test]
    fn test_success_without_completion_time_is_not_deployed() {
        let mut run =
            CheckRun::completed("Jenkins", CheckConclusion::Success, ts("2024-05-01T09:10:00Z"));
        run.completed_at = None;
        assert!(!classify(commit(), &[run], "Jenkins").is_deployed());
    }

    #[test]
    fn test_commit_fields_carried_through() {
        let c = commit()
            .with_tree("tree-1")
            .with_parents(vec!["p1".to_string(), "p2".to_string()]);
        let dc = classify(c.clone(), &[], "Jenkins");
        assert_eq!(dc.commit, c);
    }
}

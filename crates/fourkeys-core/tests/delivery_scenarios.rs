//! End-to-end delivery scenarios: classification, matching and aggregation
//! driven through the runner with an in-memory source.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use fourkeys_core::fakes::MemoryDeliverySource;
use fourkeys_core::{
    CheckConclusion, CheckRun, Commit, MetricsConfig, MetricsRunner, PullRequestRecord,
    TeamConfig,
};

const HOUR: i64 = 60 * 60 * 1000;

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid RFC3339")
        .with_timezone(&Utc)
}

fn now() -> DateTime<Utc> {
    ts("2024-03-31T12:00:00Z")
}

fn config(teams: Vec<TeamConfig>) -> MetricsConfig {
    MetricsConfig {
        owner: "hmcts".to_string(),
        teams,
        ..MetricsConfig::default()
    }
}

fn jenkins_success(at: &str) -> Vec<CheckRun> {
    vec![
        CheckRun::completed("lint", CheckConclusion::Success, ts(at)),
        CheckRun::completed("Jenkins", CheckConclusion::Success, ts(at)),
    ]
}

#[tokio::test]
async fn undeployed_merge_commit_matches_next_later_deployment() {
    let source = MemoryDeliverySource::new();
    source.add_commit(
        "svc",
        Commit::new("c1", ts("2024-03-10T09:00:00Z")),
        jenkins_success("2024-03-10T10:00:00Z"),
    );
    source.add_commit("svc", Commit::new("c2", ts("2024-03-11T09:00:00Z")), vec![]);
    source.add_commit(
        "svc",
        Commit::new("c3", ts("2024-03-12T09:00:00Z")),
        jenkins_success("2024-03-12T10:00:00Z"),
    );
    source.add_merged_change("svc", "c2", ts("2024-03-11T09:00:00Z"));

    let runner = MetricsRunner::new(
        Arc::new(source),
        config(vec![TeamConfig::new("team", &["svc"])]),
    );
    let report = runner.run(now()).await.expect("run");
    let team = &report.teams[0];

    assert_eq!(team.merged_pull_requests, 1);
    assert_eq!(team.delivered_changes, 1);
    // T3 - merge time, not T1.
    assert_eq!(team.mean_lead_time_millis, (25 * HOUR) as f64);
    assert_eq!(team.num_deployments, 2);
    assert_eq!(team.mean_deployment_gap_millis, (48 * HOUR) as f64);
}

#[tokio::test]
async fn merge_at_window_boundary_and_unmerged_are_excluded() {
    let source = MemoryDeliverySource::new();
    let boundary = now() - Duration::days(30);
    source.add_merged_change("svc", "boundary", boundary);
    source.add_merged_change("svc", "before", boundary - Duration::hours(6));
    source.add_merged_change("svc", "inside", boundary + Duration::seconds(1));
    source.add_pull_request(
        "svc",
        PullRequestRecord {
            merge_commit_sha: Some("unmerged".to_string()),
            merged_at: None,
            base_branch: "master".to_string(),
            state: "closed".to_string(),
        },
    );

    let runner = MetricsRunner::new(
        Arc::new(source),
        config(vec![TeamConfig::new("team", &["svc"])]),
    );
    let report = runner.run(now()).await.expect("run");
    assert_eq!(report.teams[0].merged_pull_requests, 1);
    assert_eq!(report.window_start, ts("2024-03-01T12:00:00Z"));
}

#[tokio::test]
async fn deployments_before_window_start_are_not_counted() {
    let source = MemoryDeliverySource::new();
    // Window starts at 2024-03-01T12:00:00Z.
    source.add_commit(
        "svc",
        Commit::new("old", ts("2024-03-01T11:00:00Z")),
        jenkins_success("2024-03-01T11:30:00Z"),
    );
    source.add_commit(
        "svc",
        Commit::new("c1", ts("2024-03-10T08:00:00Z")),
        jenkins_success("2024-03-10T09:00:00Z"),
    );
    source.add_commit(
        "svc",
        Commit::new("c2", ts("2024-03-10T12:00:00Z")),
        jenkins_success("2024-03-10T13:00:00Z"),
    );

    let runner = MetricsRunner::new(
        Arc::new(source),
        config(vec![TeamConfig::new("team", &["svc"])]),
    );
    let report = runner.run(now()).await.expect("run");
    let team = &report.teams[0];
    assert_eq!(team.num_deployments, 2);
    assert_eq!(team.deployment_gaps, 1);
    assert_eq!(team.mean_deployment_gap_millis, (4 * HOUR) as f64);
}

#[tokio::test]
async fn merges_into_other_branches_are_excluded() {
    let source = MemoryDeliverySource::new();
    source.add_pull_request(
        "svc",
        PullRequestRecord {
            merge_commit_sha: Some("feature".to_string()),
            merged_at: Some(ts("2024-03-20T00:00:00Z")),
            base_branch: "develop".to_string(),
            state: "closed".to_string(),
        },
    );
    let runner = MetricsRunner::new(
        Arc::new(source),
        config(vec![TeamConfig::new("team", &["svc"])]),
    );
    let report = runner.run(now()).await.expect("run");
    assert_eq!(report.teams[0].merged_pull_requests, 0);
}

#[tokio::test]
async fn custom_deployment_check_name_is_honoured() {
    let source = MemoryDeliverySource::new();
    source.add_commit(
        "svc",
        Commit::new("c1", ts("2024-03-10T09:00:00Z")),
        vec![
            CheckRun::completed("Jenkins", CheckConclusion::Success, ts("2024-03-10T10:00:00Z")),
            CheckRun::completed("cd/prod", CheckConclusion::Success, ts("2024-03-10T11:00:00Z")),
        ],
    );
    source.add_merged_change("svc", "c1", ts("2024-03-10T09:00:00Z"));

    let mut cfg = config(vec![TeamConfig::new("team", &["svc"])]);
    cfg.deployment_check_name = "cd/prod".to_string();
    let report = MetricsRunner::new(Arc::new(source), cfg)
        .run(now())
        .await
        .expect("run");
    assert_eq!(report.teams[0].mean_lead_time_millis, (2 * HOUR) as f64);
}

#[tokio::test]
async fn team_without_data_reports_zero_with_empty_sample_counts() {
    let source = MemoryDeliverySource::new();
    let runner = MetricsRunner::new(
        Arc::new(source),
        config(vec![TeamConfig::new("quiet", &["idle-repo"])]),
    );
    let report = runner.run(now()).await.expect("run");
    let team = &report.teams[0];
    assert_eq!(team.mean_lead_time_millis, 0.0);
    assert_eq!(team.mean_deployment_gap_millis, 0.0);
    assert!(!team.has_lead_time_data());
    assert!(!team.has_deployment_gap_data());
}

#[tokio::test]
async fn team_totals_span_all_owned_repos() {
    let source = MemoryDeliverySource::new();
    for (repo, base) in [("api", "2024-03-05"), ("web", "2024-03-06")] {
        let c1 = format!("{repo}-1");
        let c2 = format!("{repo}-2");
        source.add_commit(
            repo,
            Commit::new(&c1, ts(&format!("{base}T08:00:00Z"))),
            jenkins_success(&format!("{base}T09:00:00Z")),
        );
        source.add_commit(
            repo,
            Commit::new(&c2, ts(&format!("{base}T12:00:00Z"))),
            jenkins_success(&format!("{base}T13:00:00Z")),
        );
        source.add_merged_change(repo, &c1, ts(&format!("{base}T08:00:00Z")));
        source.add_merged_change(repo, &c2, ts(&format!("{base}T10:00:00Z")));
    }

    let runner = MetricsRunner::new(
        Arc::new(source),
        config(vec![
            TeamConfig::new("platform", &["api", "web"]),
            TeamConfig::new("empty", &["nothing"]),
        ]),
    );
    let report = runner.run(now()).await.expect("run");
    assert_eq!(report.teams.len(), 2);

    let platform = &report.teams[0];
    assert_eq!(platform.name, "platform");
    assert_eq!(platform.merged_pull_requests, 4);
    assert_eq!(platform.num_deployments, 4);
    // Lead times 1h, 3h per repo.
    assert_eq!(platform.mean_lead_time_millis, (2 * HOUR) as f64);
    // One 4h gap per repo.
    assert_eq!(platform.deployment_gaps, 2);
    assert_eq!(platform.mean_deployment_gap_millis, (4 * HOUR) as f64);
    assert_eq!(report.teams[1].merged_pull_requests, 0);
}

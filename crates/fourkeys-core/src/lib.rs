//! fourkeys core library
//!
//! Correlates merged change requests with deployment check runs to compute
//! lead time for changes and deployment frequency, per repository and per team.

pub mod config;
pub mod delivery;
pub mod domain;
pub mod fakes;
pub mod metrics;
pub mod obs;
pub mod report;
pub mod rollup;
pub mod runner;
pub mod source;
pub mod telemetry;
pub mod window;

pub use config::{MetricsConfig, TeamConfig};
pub use delivery::{
    classify, deployed_only, deployment_gaps, find_deployment_time, lead_time_samples,
    mean_gap_millis, mean_millis, MatchState, MatchStep,
};
pub use domain::{
    CheckConclusion, CheckRun, Commit, DeployedCommit, DeploymentGap, FourKeysError,
    LeadTimeSample, MergedChange, PullRequestRecord, Result,
};
pub use report::{
    format_duration_millis, render_markdown, write_markdown, write_report_json, MetricsReport,
    TeamReport,
};
pub use rollup::{RepositoryMetrics, TeamAggregate, TeamRollup};
pub use runner::{deployed_commits, repository_metrics, MetricsRunner};
pub use source::{DeliverySource, SourceError, SourceResult};
pub use window::{select_merged_changes, LookbackWindow};

pub use metrics::METRICS;
pub use obs::{emit_repo_completed, emit_run_failed, emit_run_finished, emit_run_started, RunSpan};
pub use telemetry::init_tracing;

/// fourkeys version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

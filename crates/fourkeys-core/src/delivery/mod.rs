//! Deployment correlation and aggregation.
//!
//! Provides:
//! - [`classifier::classify`] - label a commit with its deployment time from its check runs
//! - [`matcher::find_deployment_time`] - first deployment that delivered a merge commit
//! - [`lead_time`] - merge → deploy samples and their mean
//! - [`frequency`] - gaps between adjacent deployments and their mean

pub mod classifier;
pub mod frequency;
pub mod lead_time;
pub mod matcher;

pub use classifier::classify;
pub use frequency::{deployed_only, deployment_gaps, mean_gap_millis};
pub use lead_time::{lead_time_samples, mean_millis};
pub use matcher::{find_deployment_time, step, MatchState, MatchStep};

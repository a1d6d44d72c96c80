//! Domain models for delivery metrics.
//!
//! Canonical definitions for the core entities:
//! - `Commit` / `DeployedCommit`: points in a repository's history and their deployment marker
//! - `CheckRun`: a named status check attached to a commit
//! - `PullRequestRecord` / `MergedChange`: change requests as fetched, and the merged subset
//! - `LeadTimeSample` / `DeploymentGap`: the measurements the aggregators reduce

pub mod change;
pub mod commit;
pub mod error;

pub use change::{DeploymentGap, LeadTimeSample, MergedChange, PullRequestRecord};
pub use commit::{CheckConclusion, CheckRun, Commit, DeployedCommit};
pub use error::{FourKeysError, Result};

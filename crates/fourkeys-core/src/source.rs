//! The external data-retrieval seam.
//!
//! [`DeliverySource`] is implemented by code-hosting clients (see the
//! `fourkeys-github` crate) and by [`crate::fakes::MemoryDeliverySource`] in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{CheckRun, Commit, MergedChange};
use crate::window::LookbackWindow;

/// Failure reported by a data source. Never retried by the engine.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Network or connection failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote API answered with a non-success status.
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded (including malformed timestamps).
    #[error("decode error: {0}")]
    Decode(String),
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Injectable data source for change requests, commits and check runs.
#[async_trait]
pub trait DeliverySource: Send + Sync {
    /// Closed change requests merged into the baseline branch strictly after
    /// the window start, in source order.
    async fn merged_changes(
        &self,
        repo: &str,
        window: &LookbackWindow,
    ) -> SourceResult<Vec<MergedChange>>;

    /// Commits on the default branch since `since`, newest first.
    async fn commits_since(&self, repo: &str, since: DateTime<Utc>) -> SourceResult<Vec<Commit>>;

    /// Check runs evaluated against `sha`, in source order.
    async fn check_runs(&self, repo: &str, sha: &str) -> SourceResult<Vec<CheckRun>>;
}

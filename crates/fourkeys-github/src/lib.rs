//! GitHub REST data source for fourkeys
//!
//! [`GitHubClient`] implements [`fourkeys_core::DeliverySource`] on top of the
//! pulls, commits and check-runs endpoints.

pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::GitHubClient;
pub use config::GitHubConfig;
pub use error::GitHubError;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, GitHubError>;

//! Run configuration: window, deployment check, and the team → repos mapping.
//!
//! Loaded from TOML so the engine stays ignorant of where the mapping comes
//! from. Example:
//!
//! ```toml
//! owner = "hmcts"
//! lookback_days = 30
//! deployment_check_name = "Jenkins"
//!
//! [[teams]]
//! name = "fact"
//! repos = ["fact-frontend", "fact-admin", "fact-api"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{FourKeysError, Result};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;
pub const DEFAULT_DEPLOYMENT_CHECK: &str = "Jenkins";
pub const DEFAULT_BASELINE_BRANCH: &str = "master";
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 8;

/// A team and the repositories it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamConfig {
    pub name: String,
    pub repos: Vec<String>,
}

impl TeamConfig {
    pub fn new(name: impl Into<String>, repos: &[&str]) -> Self {
        Self {
            name: name.into(),
            repos: repos.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Top-level configuration for a metrics run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Organisation or user owning every configured repo.
    #[serde(default)]
    pub owner: String,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Name of the check run that marks a deployment.
    #[serde(default = "default_deployment_check")]
    pub deployment_check_name: String,
    /// Branch merged changes must target.
    #[serde(default = "default_baseline_branch")]
    pub baseline_branch: String,
    /// Upper bound on in-flight check-run requests per repo.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    #[serde(default)]
    pub teams: Vec<TeamConfig>,
}

fn default_lookback_days() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

fn default_deployment_check() -> String {
    DEFAULT_DEPLOYMENT_CHECK.to_string()
}

fn default_baseline_branch() -> String {
    DEFAULT_BASELINE_BRANCH.to_string()
}

fn default_max_concurrent_requests() -> usize {
    DEFAULT_MAX_CONCURRENT_REQUESTS
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            deployment_check_name: default_deployment_check(),
            baseline_branch: default_baseline_branch(),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            teams: Vec::new(),
        }
    }
}

impl MetricsConfig {
    /// Parse a TOML document. Does not validate.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            teams = config.teams.len(),
            "loaded metrics config"
        );
        Ok(config)
    }

    /// Total number of (team, repo) pairs a run will fetch.
    pub fn repo_count(&self) -> usize {
        self.teams.iter().map(|t| t.repos.len()).sum()
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookback_days == 0 {
            return Err(FourKeysError::InvalidConfig(
                "lookback_days must be at least 1".to_string(),
            ));
        }
        if self.deployment_check_name.trim().is_empty() {
            return Err(FourKeysError::InvalidConfig(
                "deployment_check_name must not be empty".to_string(),
            ));
        }
        if self.baseline_branch.trim().is_empty() {
            return Err(FourKeysError::InvalidConfig(
                "baseline_branch must not be empty".to_string(),
            ));
        }
        if self.max_concurrent_requests == 0 {
            return Err(FourKeysError::InvalidConfig(
                "max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        if self.teams.is_empty() {
            return Err(FourKeysError::InvalidConfig(
                "at least one team must be configured".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for team in &self.teams {
            if team.name.trim().is_empty() {
                return Err(FourKeysError::InvalidConfig(
                    "team name must not be empty".to_string(),
                ));
            }
            if !names.insert(team.name.as_str()) {
                return Err(FourKeysError::InvalidConfig(format!(
                    "duplicate team name: {}",
                    team.name
                )));
            }
            let mut repos = HashSet::new();
            for repo in &team.repos {
                if repo.trim().is_empty() {
                    return Err(FourKeysError::InvalidConfig(format!(
                        "team {} lists an empty repo name",
                        team.name
                    )));
                }
                if !repos.insert(repo.as_str()) {
                    return Err(FourKeysError::InvalidConfig(format!(
                        "team {} lists repo {} twice",
                        team.name, repo
                    )));
                }
            }
        }
        Ok(())
    }
}

//! Team-level accumulation of repository metrics.
//!
//! [`TeamRollup`] is an explicit accumulator owned by a single writer (the
//! runner's collector loop). Accumulation is append/increment only, so the
//! order in which repositories complete does not change the final report.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::TeamConfig;
use crate::delivery::mean_millis;
use crate::domain::{FourKeysError, Result};
use crate::report::TeamReport;
use crate::rollup::repository::RepositoryMetrics;

/// Running totals for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAggregate {
    pub name: String,
    /// Repos the team owns, in configuration order.
    pub repos: Vec<String>,
    pub merged_change_count: usize,
    pub deployment_count: usize,
    pub lead_times: Vec<i64>,
    pub deployment_gaps: Vec<i64>,
    reported: BTreeSet<String>,
}

impl TeamAggregate {
    pub fn new(config: &TeamConfig) -> Self {
        Self {
            name: config.name.clone(),
            repos: config.repos.clone(),
            merged_change_count: 0,
            deployment_count: 0,
            lead_times: Vec::new(),
            deployment_gaps: Vec::new(),
            reported: BTreeSet::new(),
        }
    }

    /// Fold one repository's contribution into the totals.
    pub fn accumulate(&mut self, metrics: RepositoryMetrics) -> Result<()> {
        if !self.repos.contains(&metrics.repo) {
            return Err(FourKeysError::RepoNotOwned {
                team: self.name.clone(),
                repo: metrics.repo,
            });
        }
        if !self.reported.insert(metrics.repo.clone()) {
            return Err(FourKeysError::DuplicateRepo {
                team: self.name.clone(),
                repo: metrics.repo,
            });
        }

        self.merged_change_count += metrics.merged_change_count;
        self.deployment_count += metrics.deployment_count;
        self.lead_times.extend(metrics.lead_times);
        self.deployment_gaps.extend(metrics.deployment_gaps);
        Ok(())
    }

    /// Owned repos that have not reported yet, in configuration order.
    pub fn missing_repos(&self) -> Vec<String> {
        self.repos
            .iter()
            .filter(|r| !self.reported.contains(*r))
            .cloned()
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_repos().is_empty()
    }

    pub fn to_report(&self) -> TeamReport {
        TeamReport {
            name: self.name.clone(),
            merged_pull_requests: self.merged_change_count,
            num_deployments: self.deployment_count,
            mean_lead_time_millis: mean_millis(&self.lead_times),
            mean_deployment_gap_millis: mean_millis(&self.deployment_gaps),
            delivered_changes: self.lead_times.len(),
            deployment_gaps: self.deployment_gaps.len(),
            repos: self.repos.clone(),
        }
    }
}

/// Team name → aggregate, pre-seeded from configuration.
#[derive(Debug, Clone, Default)]
pub struct TeamRollup {
    teams: BTreeMap<String, TeamAggregate>,
    order: Vec<String>,
}

impl TeamRollup {
    pub fn from_config(teams: &[TeamConfig]) -> Self {
        let mut rollup = Self::default();
        for team in teams {
            rollup.order.push(team.name.clone());
            rollup
                .teams
                .insert(team.name.clone(), TeamAggregate::new(team));
        }
        rollup
    }

    /// Fold a repository result into `team`'s aggregate.
    pub fn record(&mut self, team: &str, metrics: RepositoryMetrics) -> Result<()> {
        let aggregate = self
            .teams
            .get_mut(team)
            .ok_or_else(|| FourKeysError::UnknownTeam(team.to_string()))?;
        aggregate.accumulate(metrics)
    }

    pub fn team(&self, name: &str) -> Option<&TeamAggregate> {
        self.teams.get(name)
    }

    /// Number of repositories that have reported across all teams.
    pub fn reported_count(&self) -> usize {
        self.teams.values().map(|t| t.reported.len()).sum()
    }

    /// Produce per-team reports in configuration order.
    ///
    /// Fails if any owned repository has not reported; there is no partial report.
    pub fn finish(self) -> Result<Vec<TeamReport>> {
        let mut reports = Vec::with_capacity(self.order.len());
        for name in &self.order {
            let aggregate = self
                .teams
                .get(name)
                .ok_or_else(|| FourKeysError::UnknownTeam(name.clone()))?;
            let missing = aggregate.missing_repos();
            if !missing.is_empty() {
                return Err(FourKeysError::IncompleteRollup {
                    team: name.clone(),
                    missing,
                });
            }
            reports.push(aggregate.to_report());
        }
        Ok(reports)
    }
}

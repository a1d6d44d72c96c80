//! Report model and its renderers: JSON for machines, markdown for humans.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SECOND_MS: f64 = 1000.0;
const MINUTE_MS: f64 = 60.0 * SECOND_MS;
const HOUR_MS: f64 = 60.0 * MINUTE_MS;
const DAY_MS: f64 = 24.0 * HOUR_MS;

/// Final figures for one team.
///
/// `delivered_changes` and `deployment_gaps` are the sample counts behind the
/// two means; a mean of 0 with a count of 0 means "no data", not "instant".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamReport {
    pub name: String,
    pub merged_pull_requests: usize,
    pub num_deployments: usize,
    pub mean_lead_time_millis: f64,
    pub mean_deployment_gap_millis: f64,
    pub delivered_changes: usize,
    pub deployment_gaps: usize,
    pub repos: Vec<String>,
}

impl TeamReport {
    pub fn has_lead_time_data(&self) -> bool {
        self.delivered_changes > 0
    }

    pub fn has_deployment_gap_data(&self) -> bool {
        self.deployment_gaps > 0
    }
}

/// Report for a whole run, written for CI and dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub owner: String,
    pub lookback_days: u32,
    pub window_start: DateTime<Utc>,
    pub teams: Vec<TeamReport>,
}

/// Human-readable rendering of a millisecond duration (one decimal place).
pub fn format_duration_millis(millis: f64) -> String {
    let abs = millis.abs();
    if millis == 0.0 {
        "0".to_string()
    } else if abs < MINUTE_MS {
        format!("{} seconds", millis / SECOND_MS)
    } else if abs < HOUR_MS {
        format!("{} minutes", round1(millis / MINUTE_MS))
    } else if abs < DAY_MS {
        format!("{} hours", round1(millis / HOUR_MS))
    } else {
        format!("{} days", round1(millis / DAY_MS))
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Write the report as pretty JSON.
pub fn write_report_json(path: &Path, report: &MetricsReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report).context("serialize metrics report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Render a markdown summary, one section per team.
pub fn render_markdown(report: &MetricsReport) -> String {
    let mut out = String::new();
    out.push_str("# Delivery Metrics\n\n");
    out.push_str(&format!(
        "Owner `{}`, last {} days (since {}).\n\n",
        report.owner,
        report.lookback_days,
        report.window_start.format("%Y-%m-%d")
    ));
    out.push_str("| Team | Merged PRs | Deployments | Mean lead time | Mean time between deployments |\n");
    out.push_str("|---|---|---|---|---|\n");
    for team in &report.teams {
        let lead = if team.has_lead_time_data() {
            format_duration_millis(team.mean_lead_time_millis)
        } else {
            "no data".to_string()
        };
        let gap = if team.has_deployment_gap_data() {
            format_duration_millis(team.mean_deployment_gap_millis)
        } else {
            "no data".to_string()
        };
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            team.name, team.merged_pull_requests, team.num_deployments, lead, gap
        ));
    }
    out
}

/// Write the markdown summary.
pub fn write_markdown(path: &Path, report: &MetricsReport) -> Result<()> {
    let md = render_markdown(report);
    std::fs::write(path, md).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

//! fourkeys - delivery metrics for teams of GitHub repositories
//!
//! Computes, per team and over a trailing window:
//!
//! - the number of merged pull requests
//! - mean lead time (merge to first deployment that includes the change)
//! - deployment frequency (mean time between successful deployment checks)
//!
//! Teams come from a TOML file (`--config`); without one the bundled
//! `config/teams.toml` is used.
//!
//! Text reports written to a terminal are coloured by how good each figure
//! is; `NO_COLOR` or redirecting stdout turns that off.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use fourkeys_core::{
    format_duration_millis, render_markdown, MetricsConfig, MetricsReport, MetricsRunner,
    TeamReport,
};
use fourkeys_github::{GitHubClient, GitHubConfig};
use tracing::{info, warn, Level};

const BUNDLED_TEAMS: &str = include_str!("../../../config/teams.toml");

const HOUR_MS: f64 = 60.0 * 60.0 * 1000.0;
const DAY_MS: f64 = 24.0 * HOUR_MS;
const WEEK_MS: f64 = 7.0 * DAY_MS;

#[derive(Parser, Debug)]
#[command(name = "fourkeys")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lead time and deployment frequency per team", long_about = None)]
struct Cli {
    /// GitHub token used for API requests
    #[arg(short = 'a', long, env = "GITHUB_TOKEN", hide_env_values = true)]
    api_key: Option<String>,

    /// Organisation or user owning the repositories
    #[arg(short, long)]
    owner: Option<String>,

    /// Length of the lookback window in days
    #[arg(short, long)]
    days: Option<u32>,

    /// TOML file mapping teams to repositories
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Check run that marks a commit as deployed
    #[arg(long)]
    check_name: Option<String>,

    /// Branch that pull requests must be merged into
    #[arg(long)]
    baseline_branch: Option<String>,

    /// Maximum in-flight check-run requests per repository
    #[arg(long)]
    concurrency: Option<usize>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    fourkeys_core::init_tracing(cli.json, level);

    let config = resolve_config(&cli)?;
    let mut github = GitHubConfig::from_env(&config.owner)
        .with_baseline_branch(&config.baseline_branch);
    match cli.api_key.as_deref() {
        Some(token) => github = github.with_token(token),
        None if github.token.is_none() => {
            warn!("no GitHub token supplied, requests are subject to anonymous rate limits")
        }
        None => {}
    }
    let client = GitHubClient::new(github).context("Failed to create GitHub client")?;

    info!(
        owner = %config.owner,
        teams = config.teams.len(),
        repos = config.repo_count(),
        days = config.lookback_days,
        "gathering delivery metrics"
    );

    let started = Instant::now();
    let runner = MetricsRunner::new(Arc::new(client), config);
    let report = runner
        .run(Utc::now())
        .await
        .context("Failed to compute delivery metrics")?;
    let elapsed_ms = started.elapsed().as_millis();

    let rendered = match cli.format {
        OutputFormat::Text => render_text(&report, elapsed_ms, use_color(&cli)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        }
        OutputFormat::Markdown => render_markdown(&report),
    };
    emit(&rendered, cli.output.as_deref())
}

/// Load the team mapping and apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<MetricsConfig> {
    let mut config = match &cli.config {
        Some(path) => MetricsConfig::load(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => MetricsConfig::from_toml_str(BUNDLED_TEAMS)
            .context("Failed to parse bundled team config")?,
    };

    if let Some(owner) = &cli.owner {
        config.owner = owner.clone();
    }
    if let Some(days) = cli.days {
        config.lookback_days = days;
    }
    if let Some(name) = &cli.check_name {
        config.deployment_check_name = name.clone();
    }
    if let Some(branch) = &cli.baseline_branch {
        config.baseline_branch = branch.clone();
    }
    if let Some(n) = cli.concurrency {
        config.max_concurrent_requests = n;
    }
    if config.owner.trim().is_empty() {
        anyhow::bail!("No repository owner configured; pass --owner or set `owner` in the config");
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered).with_context(|| format!("Failed to write {:?}", path))?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Colour only text going straight to a terminal.
fn use_color(cli: &Cli) -> bool {
    cli.output.is_none()
        && std::env::var_os("NO_COLOR").is_none()
        && std::io::stdout().is_terminal()
}

/// Terminal colour for a figure, best to worst.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Band {
    Green,
    Cyan,
    Yellow,
    Red,
}

impl Band {
    /// Band for a mean duration. Zero means nothing was measured.
    fn for_millis(millis: f64, green_below: f64) -> Self {
        if millis == 0.0 {
            Band::Red
        } else if millis < green_below {
            Band::Green
        } else if millis < DAY_MS {
            Band::Cyan
        } else if millis < WEEK_MS {
            Band::Yellow
        } else {
            Band::Red
        }
    }

    fn lead_time(millis: f64) -> Self {
        Self::for_millis(millis, HOUR_MS)
    }

    fn deployment_gap(millis: f64) -> Self {
        Self::for_millis(millis, 3.5 * HOUR_MS)
    }

    fn code(self) -> &'static str {
        match self {
            Band::Green => "32",
            Band::Cyan => "36",
            Band::Yellow => "33",
            Band::Red => "31",
        }
    }
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

fn render_text(report: &MetricsReport, elapsed_ms: u128, color: bool) -> String {
    let mut out = String::new();
    for team in &report.teams {
        out.push_str(&render_team(team, report.lookback_days, color));
    }
    out.push_str(&format!("Complete in {elapsed_ms}ms\n"));
    out
}

fn render_team(team: &TeamReport, days: u32, color: bool) -> String {
    let figure = |has_data: bool, millis: f64, band: fn(f64) -> Band| {
        let (text, band) = if has_data {
            (format_duration_millis(millis), band(millis))
        } else {
            ("no data".to_string(), Band::Red)
        };
        paint(&text, band.code(), color)
    };
    let lead = figure(
        team.has_lead_time_data(),
        team.mean_lead_time_millis,
        Band::lead_time,
    );
    let gap = figure(
        team.has_deployment_gap_data(),
        team.mean_deployment_gap_millis,
        Band::deployment_gap,
    );
    let header = paint(
        &format!("############## {} ##############", team.name),
        Band::Green.code(),
        color,
    );
    let prs = paint(&team.merged_pull_requests.to_string(), "1", color);

    format!(
        "{header}\n\
         Found {prs} merged Pull Requests in the last {days} days.\n\
         Mean Lead Time is {lead}.\n\
         Deployment frequency {gap} ({deploys} deployments in {days} days).\n\n",
        deploys = team.num_deployments,
    )
}

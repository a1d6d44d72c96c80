//! GitHub REST client
//!
//! Implements [`DeliverySource`] with three listings:
//!
//! - `GET /repos/{owner}/{repo}/pulls?state=closed&base={branch}&sort=updated&direction=desc`
//! - `GET /repos/{owner}/{repo}/commits?since={iso8601}` (newest first)
//! - `GET /repos/{owner}/{repo}/commits/{sha}/check-runs`
//!
//! Listings are page-numbered; paging stops at the first short page or after
//! `max_pages` pages, whichever comes first. The pull request listing also
//! stops once a page reaches back to the window start.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use fourkeys_core::{
    select_merged_changes, CheckRun, Commit, DeliverySource, LookbackWindow, MergedChange,
    PullRequestRecord, SourceResult,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{GitHubConfig, API_VERSION};
use crate::error::GitHubError;
use crate::models::{
    ApiErrorPayload, CheckRunPayload, CheckRunsPayload, CommitPayload, PullRequestPayload,
};
use crate::Result;

/// GitHub client for change-request, commit and check-run listings
#[derive(Debug, Clone)]
pub struct GitHubClient {
    config: GitHubConfig,
    http_client: reqwest::Client,
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| GitHubError::InvalidConfig(format!("token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(GitHubClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env(owner: &str) -> Result<Self> {
        Self::new(GitHubConfig::from_env(owner))
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    /// `{api_url}/repos/{owner}/{repo}{tail}`
    pub fn repo_url(&self, repo: &str, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.owner,
            repo,
            tail
        )
    }

    /// Closed pull requests targeting the baseline branch, most recently updated first.
    ///
    /// With `updated_after`, paging stops at the first page whose oldest entry
    /// was last updated at or before that instant. A merge always updates the
    /// pull request, so later pages cannot hold a merge after it.
    pub async fn list_pull_requests(
        &self,
        repo: &str,
        updated_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<PullRequestRecord>> {
        let url = self.repo_url(repo, "/pulls");
        let query = [
            ("state", "closed".to_string()),
            ("base", self.config.baseline_branch.clone()),
            ("sort", "updated".to_string()),
            ("direction", "desc".to_string()),
        ];
        let prs: Vec<PullRequestPayload> = self
            .paged(
                &url,
                &query,
                "pull request list",
                |page: Vec<PullRequestPayload>| page,
                |batch: &[PullRequestPayload]| {
                    let oldest = batch.last().and_then(|pr| pr.updated_at);
                    match (updated_after, oldest) {
                        (Some(after), Some(updated)) => updated > after,
                        _ => true,
                    }
                },
            )
            .await?;
        Ok(prs.into_iter().map(Into::into).collect())
    }

    /// Commits on the default branch since `since`, newest first.
    pub async fn list_commits(&self, repo: &str, since: DateTime<Utc>) -> Result<Vec<Commit>> {
        let url = self.repo_url(repo, "/commits");
        let query = [("since", since.to_rfc3339_opts(SecondsFormat::Millis, true))];
        let commits: Vec<CommitPayload> = self
            .paged(
                &url,
                &query,
                "commit list",
                |page: Vec<CommitPayload>| page,
                |_: &[CommitPayload]| true,
            )
            .await?;
        Ok(commits.into_iter().map(Into::into).collect())
    }

    /// Check runs reported against `sha`.
    pub async fn list_check_runs(&self, repo: &str, sha: &str) -> Result<Vec<CheckRun>> {
        let url = self.repo_url(repo, &format!("/commits/{sha}/check-runs"));
        let runs = self
            .paged(
                &url,
                &[],
                "check-run list",
                |page: CheckRunsPayload| page.check_runs,
                |_: &[CheckRunPayload]| true,
            )
            .await?;
        Ok(runs.into_iter().map(Into::into).collect())
    }

    /// Fetch pages of `url` until a short page, the page cap, or a page for
    /// which `more` returns false.
    async fn paged<P, T, F, M>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
        items: F,
        more: M,
    ) -> Result<Vec<T>>
    where
        P: DeserializeOwned,
        F: Fn(P) -> Vec<T>,
        M: Fn(&[T]) -> bool,
    {
        let per_page = self.config.per_page.max(1);
        let mut out = Vec::new();

        for page in 1..=self.config.max_pages.max(1) {
            let body = self
                .get(url, query, &[("per_page", per_page), ("page", page)])
                .await?;
            let batch = items(
                serde_json::from_str::<P>(&body).map_err(|e| GitHubError::decode(what, e))?,
            );
            let len = batch.len();
            let keep_going = more(&batch);
            debug!(url = %url, page = page, items = len, "fetched page");
            out.extend(batch);

            if len < per_page as usize || !keep_going {
                return Ok(out);
            }
        }

        warn!(
            url = %url,
            max_pages = self.config.max_pages,
            "page cap reached, listing may be truncated"
        );
        Ok(out)
    }

    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        paging: &[(&str, u32)],
    ) -> Result<String> {
        let response = self
            .http_client
            .get(url)
            .query(query)
            .query(paging)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ApiErrorPayload>(&body)
            .map(|e| e.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });
        Err(GitHubError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl DeliverySource for GitHubClient {
    async fn merged_changes(
        &self,
        repo: &str,
        window: &LookbackWindow,
    ) -> SourceResult<Vec<MergedChange>> {
        let records = self.list_pull_requests(repo, Some(window.start())).await?;
        Ok(select_merged_changes(
            &records,
            window,
            &self.config.baseline_branch,
        ))
    }

    async fn commits_since(&self, repo: &str, since: DateTime<Utc>) -> SourceResult<Vec<Commit>> {
        Ok(self.list_commits(repo, since).await?)
    }

    async fn check_runs(&self, repo: &str, sha: &str) -> SourceResult<Vec<CheckRun>> {
        Ok(self.list_check_runs(repo, sha).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_url_joins_owner_and_repo() {
        let client = GitHubClient::new(GitHubConfig::new("hmcts")).unwrap();
        assert_eq!(
            client.repo_url("fact-api", "/pulls"),
            "https://api.github.com/repos/hmcts/fact-api/pulls"
        );
    }

    #[test]
    fn repo_url_tolerates_trailing_slash() {
        let config = GitHubConfig::new("org").with_api_url("https://ghe.example.com/api/v3/");
        let client = GitHubClient::new(config).unwrap();
        assert_eq!(
            client.repo_url("svc", "/commits/abc/check-runs"),
            "https://ghe.example.com/api/v3/repos/org/svc/commits/abc/check-runs"
        );
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let config = GitHubConfig::new("org").with_token("bad\ntoken");
        let err = GitHubClient::new(config).unwrap_err();
        assert!(matches!(err, GitHubError::InvalidConfig(_)));
    }
}

//! Connection settings for the GitHub REST API.

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_PER_PAGE: u32 = 100;
pub const DEFAULT_MAX_PAGES: u32 = 10;
pub const API_VERSION: &str = "2022-11-28";

/// GitHub client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST API base URL (GitHub Enterprise installs use `https://host/api/v3`)
    pub api_url: String,
    /// Organisation or user owning the repositories
    pub owner: String,
    /// Personal access token; anonymous requests when absent
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Branch change requests must target
    pub baseline_branch: String,
    pub per_page: u32,
    /// Upper bound on pages fetched per listing
    pub max_pages: u32,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            owner: String::new(),
            token: None,
            baseline_branch: fourkeys_core::config::DEFAULT_BASELINE_BRANCH.to_string(),
            per_page: DEFAULT_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
            user_agent: format!("fourkeys/{}", fourkeys_core::VERSION),
            timeout_secs: 30,
        }
    }
}

impl GitHubConfig {
    /// Config for `owner` against the public API.
    pub fn new(owner: &str) -> Self {
        GitHubConfig {
            owner: owner.to_string(),
            ..Self::default()
        }
    }

    /// Read `GITHUB_API_URL` and `GITHUB_TOKEN`, falling back to defaults.
    pub fn from_env(owner: &str) -> Self {
        let mut config = Self::new(owner);
        if let Ok(url) = std::env::var("GITHUB_API_URL") {
            config.api_url = url;
        }
        config.token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        config
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.to_string();
        self
    }

    pub fn with_baseline_branch(mut self, branch: &str) -> Self {
        self.baseline_branch = branch.to_string();
        self
    }

    pub fn with_paging(mut self, per_page: u32, max_pages: u32) -> Self {
        self.per_page = per_page;
        self.max_pages = max_pages;
        self
    }
}

//! Error taxonomy for the delivery metrics engine.

use crate::source::SourceError;

/// Errors produced while configuring or running a metrics computation.
#[derive(Debug, thiserror::Error)]
pub enum FourKeysError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A data-source call failed for a repository; aborts the whole run.
    #[error("fetch failed for repo {repo}: {source}")]
    Fetch {
        repo: String,
        #[source]
        source: SourceError,
    },

    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("repo {repo} is not owned by team {team}")]
    RepoNotOwned { team: String, repo: String },

    #[error("repo {repo} already reported for team {team}")]
    DuplicateRepo { team: String, repo: String },

    /// The rollup was read before every owned repo reported.
    #[error("team {team} is incomplete; missing repos: {missing:?}")]
    IncompleteRollup { team: String, missing: Vec<String> },

    #[error("repo task failed: {0}")]
    TaskJoin(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for delivery metrics operations.
pub type Result<T> = std::result::Result<T, FourKeysError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_names_repo_and_cause() {
        let err = FourKeysError::Fetch {
            repo: "probate-frontend".to_string(),
            source: SourceError::Api {
                status: 403,
                message: "API rate limit exceeded".to_string(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("probate-frontend"));
        assert!(msg.contains("rate limit"));
    }

    #[test]
    fn test_incomplete_rollup_lists_missing_repos() {
        let err = FourKeysError::IncompleteRollup {
            team: "fact".to_string(),
            missing: vec!["fact-api".to_string()],
        };
        assert!(err.to_string().contains("fact-api"));
    }
}

//! Error types for the GitHub data source

use fourkeys_core::SourceError;
use thiserror::Error;

/// Errors that can occur while talking to the GitHub REST API
#[derive(Error, Debug)]
pub enum GitHubError {
    /// Connection, TLS or timeout failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-2xx response
    #[error("GitHub API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Body did not match the expected payload shape
    #[error("failed to decode {what}: {reason}")]
    Decode { what: String, reason: String },

    /// Client could not be configured (bad token, bad URL)
    #[error("invalid GitHub configuration: {0}")]
    InvalidConfig(String),
}

impl GitHubError {
    pub(crate) fn decode(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        GitHubError::Decode {
            what: what.into(),
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GitHubError::decode("response body", err)
        } else {
            GitHubError::Http(err.to_string())
        }
    }
}

impl From<GitHubError> for SourceError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::Api { status, message } => SourceError::Api { status, message },
            GitHubError::Decode { .. } => SourceError::Decode(err.to_string()),
            GitHubError::Http(_) | GitHubError::InvalidConfig(_) => {
                SourceError::Transport(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_status() {
        let err = GitHubError::Api {
            status: 404,
            message: "Not Found".to_string(),
        };
        match SourceError::from(err) {
            SourceError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_error_maps_to_decode() {
        let err = GitHubError::decode("commit list", "premature end of input");
        let mapped = SourceError::from(err);
        assert!(matches!(mapped, SourceError::Decode(ref m) if m.contains("commit list")));
    }

    #[test]
    fn http_error_maps_to_transport() {
        let mapped = SourceError::from(GitHubError::Http("connection refused".to_string()));
        assert!(matches!(mapped, SourceError::Transport(_)));
    }
}

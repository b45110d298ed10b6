pub mod number;
pub mod types;

pub use types::{Forge, ForgeKind};

use regex::Regex;
use reqwest::Url;
use thiserror::Error;
use tracing::debug;

pub const GITHUB_HOST: &str = "github.com";

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("Constructed request URL is invalid: {0}")]
    InvalidUrl(String),
}

/// Decide which provider a remote URL points at.
///
/// GitHub is recognised by `github.com` anywhere in the URL, GitLab by
/// `gitlab_host`. GitHub is checked first.
pub fn classify(remote_url: &str, gitlab_host: &str) -> Option<Forge> {
    if remote_url.contains(GITHUB_HOST) {
        Some(Forge::GitHub)
    } else if !gitlab_host.is_empty() && remote_url.contains(gitlab_host) {
        Some(Forge::GitLab {
            host: gitlab_host.to_string(),
        })
    } else {
        None
    }
}

impl Forge {
    /// Repository slug (`owner/repo`, or `group/sub/project` on GitLab) of a
    /// remote URL on this forge.
    ///
    /// Drops everything up to and including the host and the `:` or `/` after
    /// it, and a trailing `.git`. Works for `git@host:owner/repo.git`,
    /// `https://host/owner/repo` and `ssh://git@host/owner/repo.git`.
    pub fn repo_slug(&self, remote_url: &str) -> Option<String> {
        let host = regex::escape(self.host());
        let with_suffix = Regex::new(&format!(r"^.*?{host}[:/](.+?)\.git/?$")).ok()?;
        let without_suffix = Regex::new(&format!(r"^.*?{host}[:/](.+?)/?$")).ok()?;

        let remote_url = remote_url.trim();
        [with_suffix, without_suffix]
            .iter()
            .find_map(|pattern| pattern.captures(remote_url))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Request number from a merge commit message, using this forge's patterns.
    pub fn request_number(&self, message: &str) -> Option<String> {
        match self {
            Forge::GitHub => number::github(message),
            Forge::GitLab { .. } => number::gitlab(message),
        }
    }

    /// Web URL of request `number` in repository `slug`.
    pub fn request_url(&self, slug: &str, number: &str) -> Result<Url, ForgeError> {
        let raw = match self {
            Forge::GitHub => format!("https://{GITHUB_HOST}/{slug}/pull/{number}"),
            Forge::GitLab { host } => format!("https://{host}/{slug}/merge_requests/{number}"),
        };
        let url = Url::parse(&raw).map_err(|_| ForgeError::InvalidUrl(raw.clone()))?;
        if url.scheme() != "https" || url.host_str().is_none() {
            return Err(ForgeError::InvalidUrl(raw));
        }
        debug!(%url, "built request URL");
        Ok(url)
    }
}

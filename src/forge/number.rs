//! Request numbers embedded in merge commit messages.

use regex::Regex;
use std::sync::LazyLock;

static GITHUB_PULL_REQUEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Merge pull request #(\d+)").expect("valid regex"));

/// Footer GitLab writes into merge commits: `See merge request group/project!57`.
/// The first `!N` after the marker is the request.
static GITLAB_SEE_MERGE_REQUEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"See merge request .*?!(\d+)").expect("valid regex"));

/// Trailer line `Iid: 103` on its own line.
static GITLAB_IID_TRAILER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Iid: (\d+)\s*$").expect("valid regex"));

/// Pull request number from a GitHub merge commit message.
pub fn github(message: &str) -> Option<String> {
    capture(&GITHUB_PULL_REQUEST, message)
}

/// Merge request number from a GitLab merge commit message.
///
/// The "See merge request" footer wins over an `Iid:` trailer.
pub fn gitlab(message: &str) -> Option<String> {
    capture(&GITLAB_SEE_MERGE_REQUEST, message).or_else(|| capture(&GITLAB_IID_TRAILER, message))
}

fn capture(pattern: &Regex, message: &str) -> Option<String> {
    pattern
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

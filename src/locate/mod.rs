pub mod types;

pub use types::{Located, Selection};

use thiserror::Error;
use tracing::{debug, info, info_span, Instrument};

use crate::config::Config;
use crate::forge::{self, ForgeError};
use crate::git::{GitError, RevisionControl};

/// Remote whose HEAD decides the default branch.
pub const DEFAULT_REMOTE: &str = "origin";

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("No commit selected: pass a revision or --blame FILE:LINE")]
    NoContext,

    #[error("Could not find merge commit for {commit}")]
    MergeCommitNotFound { commit: String },

    #[error("No URL configured for remote '{remote}'")]
    NoRemoteUrl { remote: String },

    #[error("Remote is neither GitHub nor the configured GitLab host: {url}")]
    UnrecognizedProvider { url: String },

    #[error("Could not parse repository from remote URL: {url}")]
    RepoSlugUnparseable { url: String },

    #[error("No pull or merge request number in message of {merge_commit}")]
    RequestNumberNotFound { merge_commit: String },

    #[error(transparent)]
    Forge(#[from] ForgeError),

    #[error(transparent)]
    Git(#[from] GitError),
}

/// Turn the user's selection into a full commit hash.
///
/// A missing selection, or a blame of a line that isn't committed yet, has no
/// commit to look up.
pub async fn starting_commit<G: RevisionControl + ?Sized>(
    git: &G,
    selection: Option<&Selection>,
) -> Result<String, LocateError> {
    let commit = match selection.ok_or(LocateError::NoContext)? {
        Selection::Revision(rev) => git.resolve_commit(rev).await?,
        Selection::Blame { path, line } => git.blame_commit(path, *line).await?,
    };
    if commit.chars().all(|c| c == '0') {
        debug!("selected line is not committed yet");
        return Err(LocateError::NoContext);
    }
    Ok(commit)
}

/// Find the pull or merge request that brought `commit` into the default branch.
///
/// Stages run in order and the first failure ends the lookup:
/// default branch, merge commit, remote, provider, slug, request number.
pub async fn locate<G: RevisionControl + ?Sized>(
    git: &G,
    config: &Config,
    commit: &str,
) -> Result<Located, LocateError> {
    let span = info_span!("locate", commit = %commit);
    async move {
        let default_branch = git
            .resolve_symbolic_head(DEFAULT_REMOTE)
            .await
            .unwrap_or_else(|| {
                debug!(fallback = %config.default_branch, "using configured default branch");
                config.default_branch.clone()
            });
        info!(%default_branch, "resolved default branch");

        let merge_commit = git
            .find_earliest_merge_on_path(commit, &default_branch)
            .await?
            .ok_or_else(|| LocateError::MergeCommitNotFound {
                commit: commit.to_string(),
            })?;
        info!(%merge_commit, "found merge commit");

        let remote = match &config.remote {
            Some(remote) => remote.clone(),
            None => git
                .current_remote()
                .await?
                .unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
        };
        let remote_url = git
            .remote_url(&remote)
            .await?
            .ok_or_else(|| LocateError::NoRemoteUrl {
                remote: remote.clone(),
            })?;
        debug!(%remote, %remote_url, "read remote URL");

        let forge = forge::classify(&remote_url, &config.gitlab.host).ok_or_else(|| {
            LocateError::UnrecognizedProvider {
                url: remote_url.clone(),
            }
        })?;
        let slug = forge
            .repo_slug(&remote_url)
            .ok_or_else(|| LocateError::RepoSlugUnparseable {
                url: remote_url.clone(),
            })?;
        debug!(%forge, %slug, "classified remote");

        let message = git.commit_message(&merge_commit).await?;
        let number = forge.request_number(&message).ok_or_else(|| {
            LocateError::RequestNumberNotFound {
                merge_commit: merge_commit.clone(),
            }
        })?;

        let url = forge.request_url(&slug, &number)?;
        info!(%url, "located request");

        Ok(Located {
            commit: commit.to_string(),
            default_branch,
            merge_commit,
            remote,
            remote_url,
            forge,
            slug,
            number,
            url,
        })
    }
    .instrument(span)
    .await
}

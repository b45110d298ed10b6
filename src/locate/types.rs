use reqwest::Url;
use std::path::PathBuf;

use crate::forge::Forge;

/// Where the starting commit comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A commit hash or any revision git can resolve.
    Revision(String),
    /// The commit that last changed `line` of `path`.
    Blame { path: PathBuf, line: u32 },
}

impl Selection {
    /// Parse a `FILE:LINE` blame selection. Lines are 1-based.
    pub fn blame(value: &str) -> Option<Selection> {
        let (path, line) = value.rsplit_once(':')?;
        let line = line.trim().parse::<u32>().ok().filter(|&l| l > 0)?;
        if path.is_empty() {
            return None;
        }
        Some(Selection::Blame {
            path: PathBuf::from(path),
            line,
        })
    }
}

/// Everything learned while locating a request.
#[derive(Debug, Clone)]
pub struct Located {
    /// Commit the lookup started from
    pub commit: String,
    /// Branch the merge was searched towards
    pub default_branch: String,
    /// Merge commit that brought `commit` into `default_branch`
    pub merge_commit: String,
    /// Remote whose URL identified the repository
    pub remote: String,
    pub remote_url: String,
    pub forge: Forge,
    /// Repository slug, e.g. "acme/widget"
    pub slug: String,
    /// PR or MR number as written in the merge message
    pub number: String,
    /// Web page of the request
    pub url: Url,
}

use serde::Serialize;

use crate::forge::ForgeKind;
use crate::locate::Located;

/// How a located request is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Announce the URL and open it in the browser
    Open,
    /// Print the bare URL
    Print,
    /// Print the full lookup record as JSON
    Json,
}

/// JSON shape of a lookup result.
#[derive(Debug, Serialize)]
pub struct LocatedRecord<'a> {
    pub commit: &'a str,
    pub default_branch: &'a str,
    pub merge_commit: &'a str,
    pub remote: &'a str,
    pub remote_url: &'a str,
    pub forge: ForgeKind,
    pub slug: &'a str,
    pub number: &'a str,
    pub url: &'a str,
}

impl<'a> From<&'a Located> for LocatedRecord<'a> {
    fn from(located: &'a Located) -> Self {
        Self {
            commit: &located.commit,
            default_branch: &located.default_branch,
            merge_commit: &located.merge_commit,
            remote: &located.remote,
            remote_url: &located.remote_url,
            forge: located.forge.kind(),
            slug: &located.slug,
            number: &located.number,
            url: located.url.as_str(),
        }
    }
}

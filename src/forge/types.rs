use serde::Serialize;

/// Hosting provider a remote belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Forge {
    GitHub,
    /// GitLab instance at `host` (e.g. "gitlab.com").
    GitLab { host: String },
}

impl Forge {
    /// Host name used in web URLs.
    pub fn host(&self) -> &str {
        match self {
            Forge::GitHub => super::GITHUB_HOST,
            Forge::GitLab { host } => host,
        }
    }

    pub fn kind(&self) -> ForgeKind {
        match self {
            Forge::GitHub => ForgeKind::GitHub,
            Forge::GitLab { .. } => ForgeKind::GitLab,
        }
    }
}

impl std::fmt::Display for Forge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Forge::GitHub => write!(f, "GitHub"),
            Forge::GitLab { host } => write!(f, "GitLab ({})", host),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ForgeKind {
    GitHub,
    GitLab,
}

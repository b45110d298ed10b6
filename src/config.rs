use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File looked up in the current directory when no `--config` is given.
pub const CONFIG_FILE: &str = ".pr-finder.toml";

pub const DEFAULT_GITLAB_HOST: &str = "gitlab.com";
pub const DEFAULT_BRANCH: &str = "master";

pub const ENV_GITLAB_HOST: &str = "PR_FINDER_GITLAB_HOST";
pub const ENV_DEFAULT_BRANCH: &str = "PR_FINDER_DEFAULT_BRANCH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings the lookup pipeline reads at call time.
///
/// Built once per invocation and handed to `locate::locate`; nothing in the
/// crate reads configuration from anywhere else.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitLab settings
    pub gitlab: GitLabConfig,
    /// Branch used when the remote does not advertise its HEAD
    pub default_branch: String,
    /// Remote to read the URL from instead of the current branch's remote
    pub remote: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GitLabConfig {
    /// Host that identifies a GitLab remote (e.g. "gitlab.example.com")
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gitlab: GitLabConfig {
                host: DEFAULT_GITLAB_HOST.to_string(),
            },
            default_branch: DEFAULT_BRANCH.to_string(),
            remote: None,
        }
    }
}

/// On-disk shape of `.pr-finder.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    gitlab: FileGitLabConfig,
    default_branch: Option<String>,
    remote: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileGitLabConfig {
    host: Option<String>,
}

/// Values given on the command line; they win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub gitlab_host: Option<String>,
    pub default_branch: Option<String>,
    pub remote: Option<String>,
}

impl Config {
    /// Load configuration: defaults, then the config file, then the
    /// `PR_FINDER_*` environment variables, then `overrides`.
    ///
    /// `path` is an explicit `--config` file and must exist. Without it,
    /// `.pr-finder.toml` in the current directory is used when present.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Config, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok(), overrides)
    }

    /// `load` with environment lookups going through `env`.
    pub fn load_with_env(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
        overrides: &Overrides,
    ) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path)?
                } else {
                    Config::default()
                }
            }
        };

        config.apply(env(ENV_GITLAB_HOST), env(ENV_DEFAULT_BRANCH), None);
        config.apply(
            overrides.gitlab_host.clone(),
            overrides.default_branch.clone(),
            overrides.remote.clone(),
        );

        Ok(config)
    }

    /// Load from a specific path on top of the defaults.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Config, ConfigError> {
        let file: FileConfig = toml::from_str(contents)?;
        let mut config = Config::default();
        config.apply(file.gitlab.host, file.default_branch, file.remote);
        Ok(config)
    }

    /// Layer values over the current ones. Blank values are ignored.
    fn apply(
        &mut self,
        gitlab_host: Option<String>,
        default_branch: Option<String>,
        remote: Option<String>,
    ) {
        if let Some(host) = non_blank(gitlab_host) {
            self.gitlab.host = host;
        }
        if let Some(branch) = non_blank(default_branch) {
            self.default_branch = branch;
        }
        if let Some(remote) = non_blank(remote) {
            self.remote = Some(remote);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

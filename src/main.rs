mod browser;
mod config;
mod forge;
mod git;
mod locate;
mod report;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::locate::{LocateError, Selection};
use crate::report::OutputMode;

/// pr-finder: find the GitHub pull request or GitLab merge request that
/// brought a commit into the default branch, and open it in the browser.
#[derive(Parser, Debug)]
#[command(name = "pr-finder", version, about)]
struct Cli {
    /// Commit hash or revision to look up (e.g. a1b2c3d, HEAD~2)
    #[arg(conflicts_with = "blame")]
    revision: Option<String>,

    /// Start from the commit that last changed a line, given as FILE:LINE
    #[arg(long, value_name = "FILE:LINE")]
    blame: Option<String>,

    /// Repository directory (defaults to the current directory)
    #[arg(short = 'C', long = "repo", value_name = "DIR")]
    repo: Option<PathBuf>,

    /// Config file (defaults to .pr-finder.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Host that identifies GitLab remotes
    #[arg(long, value_name = "HOST")]
    gitlab_host: Option<String>,

    /// Branch to use when the remote's HEAD can't be read
    #[arg(long, value_name = "NAME")]
    default_branch: Option<String>,

    /// Remote to read the repository URL from
    #[arg(long, value_name = "NAME")]
    remote: Option<String>,

    /// Print the URL instead of opening it
    #[arg(long)]
    no_browser: bool,

    /// Print the lookup result as JSON (never opens the browser)
    #[arg(long, conflicts_with = "no_browser")]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.no_browser {
            OutputMode::Print
        } else {
            OutputMode::Open
        }
    }

    fn selection(&self) -> Result<Option<Selection>, LocateError> {
        match (&self.revision, &self.blame) {
            (Some(rev), _) => Ok(Some(Selection::Revision(rev.clone()))),
            (None, Some(value)) => Selection::blame(value)
                .map(Some)
                .ok_or(LocateError::NoContext),
            (None, None) => Ok(None),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("pr_finder=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let selection = cli.selection()?;

    info!("loading configuration");
    let overrides = config::Overrides {
        gitlab_host: cli.gitlab_host.clone(),
        default_branch: cli.default_branch.clone(),
        remote: cli.remote.clone(),
    };
    let config = config::Config::load(cli.config.as_deref(), &overrides)?;
    debug!(gitlab_host = %config.gitlab.host, default_branch = %config.default_branch, "configuration loaded");

    let workdir = cli.repo.clone().unwrap_or_else(|| PathBuf::from("."));
    let git = git::GitCli::new(workdir);

    let commit = locate::starting_commit(&git, selection.as_ref()).await?;
    info!(%commit, "resolved starting commit");

    let located = locate::locate(&git, &config, &commit).await?;
    report::output(&located, cli.output_mode())?;
    Ok(())
}

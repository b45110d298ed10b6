pub mod types;

pub use types::{LocatedRecord, OutputMode};

use colored::Colorize;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::browser::{self, BrowserError};
use crate::locate::Located;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to serialize result: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

/// Present a located request on stdout and, in `Open` mode, hand its URL
/// to the browser.
#[instrument(skip(located), fields(url = %located.url))]
pub fn output(located: &Located, mode: OutputMode) -> Result<(), ReportError> {
    let stdout = std::io::stdout();
    render(located, mode, &mut stdout.lock())?;

    if mode == OutputMode::Open {
        browser::open_url(located.url.as_str())?;
    }
    Ok(())
}

/// Write the user-facing text for `located`.
///
/// - `Open`: `Opening: <url>`
/// - `Print`: the bare URL
/// - `Json`: pretty-printed `LocatedRecord`
pub fn render<W: Write>(located: &Located, mode: OutputMode, out: &mut W) -> Result<(), ReportError> {
    debug!(?mode, "rendering result");
    match mode {
        OutputMode::Open => writeln!(out, "{} {}", "Opening:".green().bold(), located.url)?,
        OutputMode::Print => writeln!(out, "{}", located.url)?,
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, &LocatedRecord::from(located))?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Print a fatal error as a single line on stderr.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

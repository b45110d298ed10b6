use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to open browser for {url}: {source}")]
    Launch {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Open a URL in the user's default browser.
pub fn open_url(url: &str) -> Result<(), BrowserError> {
    debug!(%url, "launching browser");
    webbrowser::open(url).map_err(|source| BrowserError::Launch {
        url: url.to_string(),
        source,
    })
}

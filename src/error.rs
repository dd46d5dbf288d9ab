use thiserror::Error;

/// Everything that can end a scrape run
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Missing credentials, bad selectors, unreadable config
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Login did not reach the signed-in page in time
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The people page yielded no entries
    #[error("no profiles found for company '{company}'")]
    EmptyResult { company: String },

    /// A scraped profile URL has no `/in/` segment
    #[error("entry {index}: no profile identifier in URL '{url}'")]
    Extraction { index: usize, url: String },

    #[error("could not start WebDriver session: {0}")]
    WebDriverSession(#[from] fantoccini::error::NewSessionError),

    #[error("WebDriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

use thiserror::Error;

/// Errors surfaced by the downloader.
///
/// Only the fatal-to-session cases ever leave a session as an `Err`; traversal
/// and per-page problems are folded into the report types in [`crate::results`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Browser session could not be created: {0}")]
    WebDriver(String),

    #[error("Browser command failed: {0}")]
    Surface(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported URL (expected praisecharts.com/songs/details/...): {0}")]
    UnsupportedUrl(String),

    #[error("URL appears invalid (redirects to domain root): {0}")]
    RedirectsToRoot(String),

    #[error("Could not locate first preview image URL")]
    NoInitialContent,

    #[error("{0}")]
    InvalidInput(String),
}

impl From<fantoccini::error::CmdError> for Error {
    fn from(e: fantoccini::error::CmdError) -> Self {
        Error::Surface(e.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for Error {
    fn from(e: fantoccini::error::NewSessionError) -> Self {
        Error::WebDriver(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

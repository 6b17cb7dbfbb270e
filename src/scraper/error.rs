//! Error types for the scraper module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for scraper operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The URL does not match the accepted URL grammar
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The remote server answered with a non-success status
    #[error("Failed to fetch {url}: HTTP {status}")]
    Status {
        /// Requested URL
        url: String,
        /// Status code returned by the server
        status: u16,
    },

    /// HTTP client error (connection, timeout, body decoding)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<ScrapeError> for CrateError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::InvalidUrl(url) => CrateError::InvalidUrl(url),
            _ => CrateError::Fetch(err.to_string()),
        }
    }
}

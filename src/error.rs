//! Error types for the sales assistant crate

use thiserror::Error;

use crate::insight::InsightError;
use crate::request::ValidationError;

/// Result type for sales assistant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sales assistant operations
///
/// The variants form a closed set so callers can tell user-correctable input
/// problems (`Validation`, `InvalidUrl`, `FileProcessing`) apart from upstream
/// failures (`Fetch`, `InsightGeneration`).
#[derive(Debug, Error)]
pub enum Error {
    /// Request fields were missing, malformed or out of range
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The company URL does not match the accepted URL grammar
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The company website could not be retrieved
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The uploaded attachment could not be read
    #[error("File processing error: {0}")]
    FileProcessing(String),

    /// The completion service failed or returned unusable output
    #[error("Insight generation error: {0}")]
    InsightGeneration(#[from] InsightError),

    /// Invalid runtime configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the caller can fix this error by changing the request
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::InvalidUrl(_) | Error::FileProcessing(_)
        )
    }
}

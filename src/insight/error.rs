use rig::completion::CompletionError;
use thiserror::Error;

/// Errors raised while turning company data into insights
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("Completion request failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Completion service returned an empty response")]
    EmptyResponse,

    #[error("Error parsing JSON response: {0}")]
    Parse(#[from] serde_json::Error),
}

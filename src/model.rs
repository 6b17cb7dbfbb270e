//! # LLM Client Module
//!
//! This module provides the completion model used by the insight generator,
//! with built-in rate limiting to prevent API quota exhaustion.
//!
//! ## Key Components
//!
//! - `Client`: A client that wraps the completion model
//! - `RateLimitedCompletionModel`: A wrapper that adds rate limiting to any completion model
//! - `MockCompletionModel`: A scripted model for tests and offline runs
//!
//! The concrete provider is OpenAI-compatible chat completion; everything
//! downstream is generic over `rig`'s `CompletionModel`, so tests swap in the
//! mock without touching the pipeline.

use rig::{completion::CompletionModel, providers::openai};

use crate::error::{Error, Result};

pub mod mock_model;
pub mod ratelimited_completion;

pub use mock_model::{MockCompletionModel, RecordedRequest};
pub use ratelimited_completion::RateLimitedCompletionModel;

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0125";

/// Default request budget for the completion model
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

/// Settings for the OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    /// Alternative API base URL, e.g. a proxy or a compatible local server
    pub base_url: Option<String>,
    pub model: String,
    pub requests_per_minute: u32,
}

impl OpenAiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
        }
    }

    /// Read the API key from `OPENAI_API_KEY`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::Config("OPENAI_API_KEY environment variable must be set".into()))?;
        Ok(Self::new(api_key))
    }
}

#[derive(Debug, Clone)]
pub struct Client<C>
where
    C: CompletionModel,
{
    completion_model: C,
}

impl<C> Client<C>
where
    C: CompletionModel,
{
    pub fn new(completion_model: C) -> Self {
        Self { completion_model }
    }

    pub fn into_completion(self) -> C {
        self.completion_model
    }
}

/// Build a rate-limited OpenAI completion client
pub fn new_openai(
    settings: OpenAiSettings,
) -> Result<Client<RateLimitedCompletionModel<impl CompletionModel>>> {
    if settings.api_key.trim().is_empty() {
        return Err(Error::Config("OpenAI API key must not be empty".into()));
    }

    let openai_client = match settings.base_url.as_deref() {
        Some(base_url) => openai::Client::from_url(&settings.api_key, base_url),
        None => openai::Client::new(&settings.api_key),
    };
    let model = RateLimitedCompletionModel::per_minute(
        openai_client.completion_model(&settings.model),
        settings.requests_per_minute,
    )?;
    Ok(Client::new(model))
}

/// Build a rate-limited OpenAI completion client from `OPENAI_API_KEY`
pub fn new_openai_from_env() -> Result<Client<RateLimitedCompletionModel<impl CompletionModel>>> {
    new_openai(OpenAiSettings::from_env()?)
}

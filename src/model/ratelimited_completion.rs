use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use rig::completion::{CompletionError, CompletionModel, CompletionRequest, CompletionResponse};
use tracing::{Instrument, debug_span, info_span};

use crate::error::{Error, Result};

/// Completion model that waits on a shared quota before every call
#[derive(Clone)]
pub struct RateLimitedCompletionModel<M: CompletionModel> {
    model: M,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl<M> RateLimitedCompletionModel<M>
where
    M: CompletionModel,
{
    pub fn new(model: M, limiter: DefaultDirectRateLimiter) -> Self {
        Self {
            model,
            limiter: Arc::new(limiter),
        }
    }

    /// Wrap `model` with a quota of `requests` calls per minute
    pub fn per_minute(model: M, requests: u32) -> Result<Self> {
        let requests = NonZeroU32::new(requests)
            .ok_or_else(|| Error::Config("LLM requests per minute must be positive".into()))?;
        Ok(Self::new(
            model,
            RateLimiter::direct(Quota::per_minute(requests)),
        ))
    }
}

impl<M: CompletionModel> CompletionModel for RateLimitedCompletionModel<M> {
    type Response = M::Response;

    async fn completion(
        &self,
        completion_request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse<Self::Response>, CompletionError> {
        self.limiter
            .until_ready()
            .instrument(debug_span!("limiter"))
            .await;
        self.model
            .completion(completion_request)
            .instrument(info_span!("completion"))
            .await
    }
}

//! # Mock Completion Model for Testing
//!
//! Provides a `MockCompletionModel` that implements the `CompletionModel` trait
//! for tests and offline runs. Responses are scripted as a queue consumed in
//! call order, and every request the model sees is recorded so tests can check
//! what was asked and in which order.

use std::collections::VecDeque;
use std::sync::Arc;

use rig::{
    completion::{
        AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    },
    one_or_many::OneOrMany,
};
use serde_json::Value;
use tokio::sync::Mutex;

/// What the mock saw for one completion call
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub preamble: Option<String>,
    /// Debug rendering of the prompt message
    pub prompt: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u64>,
    pub additional_params: Option<Value>,
}

#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Error(String),
}

/// A mock completion model for testing purposes.
///
/// Each call pops the next scripted reply. With an empty script it answers
/// with an empty text.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionModel {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockCompletionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that answers with `replies` in order
    pub async fn with_texts<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for reply in replies {
            mock.push_text(reply).await;
        }
        mock
    }

    /// Queue a text reply
    pub async fn push_text(&self, text: impl Into<String>) {
        self.script.lock().await.push_back(Scripted::Text(text.into()));
    }

    /// Queue a provider failure
    pub async fn push_error(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Error(message.into()));
    }

    /// Requests received so far, oldest first
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl CompletionModel for MockCompletionModel {
    type Response = String;

    async fn completion(
        &self,
        completion_request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        self.requests.lock().await.push(RecordedRequest {
            preamble: completion_request.preamble.clone(),
            prompt: format!("{:?}", completion_request.prompt),
            temperature: completion_request.temperature,
            max_tokens: completion_request.max_tokens,
            additional_params: completion_request.additional_params.clone(),
        });

        let next = self.script.lock().await.pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text(&text)),
                raw_response: text,
            }),
            Some(Scripted::Error(message)) => Err(CompletionError::ProviderError(message)),
            None => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text("")),
                raw_response: String::new(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order() {
        let mock = MockCompletionModel::with_texts(["first", "second"]).await;
        mock.push_error("boom").await;

        let first = mock.completion_request("a").send().await.unwrap();
        let second = mock.completion_request("b").send().await.unwrap();
        let third = mock.completion_request("c").send().await;

        assert_eq!(first.raw_response, "first");
        assert_eq!(second.raw_response, "second");
        assert!(matches!(third, Err(CompletionError::ProviderError(m)) if m == "boom"));
        assert_eq!(mock.call_count().await, 3);
    }

    #[tokio::test]
    async fn test_records_request_parameters() {
        let mock = MockCompletionModel::new();
        mock.completion_request("Tell me about Acme")
            .preamble("You are helpful".to_string())
            .temperature(0.7)
            .max_tokens(1000)
            .send()
            .await
            .unwrap();

        let recorded = mock.requests().await;
        assert_eq!(recorded[0].preamble.as_deref(), Some("You are helpful"));
        assert_eq!(recorded[0].temperature, Some(0.7));
        assert_eq!(recorded[0].max_tokens, Some(1000));
        assert!(recorded[0].prompt.contains("Tell me about Acme"));
    }
}

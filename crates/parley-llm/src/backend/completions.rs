//! Chat completions backend (message-array protocol)

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use parley_config::LlmConfig;
use reqwest::Client;
use secrecy::SecretString;
use url::Url;

use super::{Backend, BackendRequest, EventStream, endpoint, post_json};
use crate::convert::completions::chunk_to_events;
use crate::error::LlmError;
use crate::protocol::completions::{ChatChunk, ChatRequest, ChatResponse};
use crate::types::{CompletionResponse, StreamEvent, StreamFrame};

/// Default chat completions API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Backend speaking the chat completions protocol
pub struct CompletionsBackend {
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

impl CompletionsBackend {
    /// Create from backend configuration
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Internal` if the default base URL cannot be parsed.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_BASE_URL).map_err(|e| LlmError::Internal(e.into()))?,
        };

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn completions_url(&self) -> String {
        endpoint(&self.base_url, "chat/completions")
    }
}

#[async_trait]
impl Backend for CompletionsBackend {
    fn name(&self) -> &'static str {
        "completions"
    }

    async fn complete(&self, request: &BackendRequest) -> Result<CompletionResponse, LlmError> {
        let mut wire_request = ChatRequest::from(request);
        wire_request.stream = None;

        let response = post_json(
            &self.client,
            &self.completions_url(),
            self.api_key.as_ref(),
            &wire_request,
            self.name(),
        )
        .await?;

        let wire_response: ChatResponse = response.json().await.map_err(|e| LlmError::Backend {
            status: None,
            message: format!("failed to parse response: {e}"),
        })?;

        Ok(wire_response.into())
    }

    async fn complete_stream(&self, request: &BackendRequest) -> Result<EventStream, LlmError> {
        let mut wire_request = ChatRequest::from(request);
        wire_request.stream = Some(true);

        let response = post_json(
            &self.client,
            &self.completions_url(),
            self.api_key.as_ref(),
            &wire_request,
            self.name(),
        )
        .await?;

        let mapped = response
            .bytes_stream()
            .eventsource()
            .map(|result| match result {
                Ok(event) => {
                    let data = event.data.trim();
                    if data == StreamFrame::DONE {
                        return vec![Ok(StreamEvent::Completed)];
                    }

                    match serde_json::from_str::<ChatChunk>(data) {
                        Ok(chunk) => chunk_to_events(&chunk).into_iter().map(Ok).collect(),
                        Err(e) => {
                            tracing::debug!(error = %e, data = %data, "skipping unparseable SSE chunk");
                            vec![]
                        }
                    }
                }
                Err(e) => vec![Err(LlmError::Streaming(e.to_string()))],
            })
            .flat_map(futures_util::stream::iter);

        Ok(Box::pin(mapped))
    }
}

//! Responses backend (transcript protocol with typed stream events)

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use parley_config::LlmConfig;
use reqwest::Client;
use secrecy::SecretString;
use url::Url;

use super::{Backend, BackendRequest, EventStream, endpoint, post_json};
use crate::convert::responses::interpret_event;
use crate::error::LlmError;
use crate::formatter::format_response;
use crate::protocol::responses::{ResponsesRequest, ResponsesResponse, ResponsesStreamEvent};
use crate::types::CompletionResponse;

/// Default responses API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Backend speaking the responses protocol
pub struct ResponsesBackend {
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

impl ResponsesBackend {
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

    fn responses_url(&self) -> String {
        endpoint(&self.base_url, "responses")
    }
}

#[async_trait]
impl Backend for ResponsesBackend {
    fn name(&self) -> &'static str {
        "responses"
    }

    async fn complete(&self, request: &BackendRequest) -> Result<CompletionResponse, LlmError> {
        let mut wire_request = ResponsesRequest::from(request);
        wire_request.stream = None;

        let response = post_json(
            &self.client,
            &self.responses_url(),
            self.api_key.as_ref(),
            &wire_request,
            self.name(),
        )
        .await?;

        let wire_response: ResponsesResponse = response.json().await.map_err(|e| LlmError::Backend {
            status: None,
            message: format!("failed to parse response: {e}"),
        })?;

        Ok(format_response(&wire_response))
    }

    async fn complete_stream(&self, request: &BackendRequest) -> Result<EventStream, LlmError> {
        let mut wire_request = ResponsesRequest::from(request);
        wire_request.stream = Some(true);

        let response = post_json(
            &self.client,
            &self.responses_url(),
            self.api_key.as_ref(),
            &wire_request,
            self.name(),
        )
        .await?;

        let mapped = response
            .bytes_stream()
            .eventsource()
            .filter_map(|result| async move {
                match result {
                    Ok(event) => match serde_json::from_str::<ResponsesStreamEvent>(&event.data) {
                        Ok(native) => interpret_event(native).transpose(),
                        Err(e) => {
                            tracing::debug!(error = %e, event = %event.event, "skipping unparseable stream event");
                            None
                        }
                    },
                    Err(e) => Some(Err(LlmError::Streaming(e.to_string()))),
                }
            });

        Ok(Box::pin(mapped))
    }
}

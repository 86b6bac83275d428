//! Backend adapters for the two supported completion protocols

pub mod completions;
pub mod responses;

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::Stream;
use parley_config::{BackendType, LlmConfig};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

pub use self::completions::CompletionsBackend;
pub use self::responses::ResponsesBackend;
use crate::error::LlmError;
use crate::protocol::ErrorResponse;
use crate::types::{CompletionResponse, Message, StreamEvent, ToolDefinition};

/// Lazily produced, single-pass sequence of canonical stream events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send>>;

/// Everything an adapter needs to issue one backend call
#[derive(Debug, Clone)]
pub struct BackendRequest {
    /// Model identifier
    pub model: String,
    /// Full conversation, context preamble included
    pub messages: Vec<Message>,
    /// Tools the model may call
    pub tools: Vec<ToolDefinition>,
    /// Whether to request an incremental event stream
    pub stream: bool,
}

/// Result of submitting a request to a backend
pub enum BackendResult {
    /// Terminal response, already in canonical shape
    Complete(CompletionResponse),
    /// Incremental events, already translated from the native shape
    Stream(EventStream),
}

impl std::fmt::Debug for BackendResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete(response) => f.debug_tuple("Complete").field(response).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Trait implemented by each backend protocol adapter
#[async_trait]
pub trait Backend: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Send a non-streaming request
    async fn complete(&self, request: &BackendRequest) -> Result<CompletionResponse, LlmError>;

    /// Send a streaming request
    async fn complete_stream(&self, request: &BackendRequest) -> Result<EventStream, LlmError>;

    /// Send a request in the mode it asks for
    async fn submit(&self, request: &BackendRequest) -> Result<BackendResult, LlmError> {
        if request.stream {
            self.complete_stream(request).await.map(BackendResult::Stream)
        } else {
            self.complete(request).await.map(BackendResult::Complete)
        }
    }
}

/// Build the configured backend adapter
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn Backend>, LlmError> {
    let backend: Arc<dyn Backend> = match config.backend {
        BackendType::Completions => Arc::new(CompletionsBackend::new(config)?),
        BackendType::Responses => Arc::new(ResponsesBackend::new(config)?),
    };

    tracing::debug!(backend = backend.name(), "backend adapter initialized");
    Ok(backend)
}

/// Join a path onto a base URL, tolerating a trailing slash
pub(crate) fn endpoint(base_url: &url::Url, path: &str) -> String {
    let base = base_url.as_str().trim_end_matches('/');
    format!("{base}/{path}")
}

/// POST a JSON body and translate any failure into a backend error
pub(crate) async fn post_json<T>(
    client: &Client,
    url: &str,
    api_key: Option<&SecretString>,
    body: &T,
    backend: &str,
) -> Result<reqwest::Response, LlmError>
where
    T: Serialize + Sync + ?Sized,
{
    let mut builder = client.post(url).json(body);
    if let Some(key) = api_key {
        builder = builder.bearer_auth(key.expose_secret());
    }

    let response = builder.send().await.map_err(|e| {
        tracing::error!(backend, error = %e, "backend request failed");
        LlmError::Backend {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(backend, error = %e, "failed to read backend error body");
            String::new()
        }
    };
    tracing::warn!(backend, status = %status, "backend returned error");

    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.is_empty() => status.to_string(),
        Err(_) => body,
    };

    Err(LlmError::Backend {
        status: Some(status.as_u16()),
        message,
    })
}

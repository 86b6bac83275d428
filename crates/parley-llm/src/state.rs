//! Shared state for the completion route

use std::sync::Arc;

use parley_config::LlmConfig;
use parley_core::RequestContext;

use crate::error::LlmError;
use crate::orchestrator::{Completion, Orchestrator};
use crate::types::{ChatCompletionRequest, Message};

/// Shared state for LLM route handlers
#[derive(Clone)]
pub struct LlmState {
    pub(crate) inner: Arc<LlmStateInner>,
}

pub(crate) struct LlmStateInner {
    pub(crate) orchestrator: Orchestrator,
    defaults: RequestDefaults,
}

/// Values assumed when the caller leaves optional fields out
struct RequestDefaults {
    model: String,
    channel: String,
    user_id: String,
}

impl LlmState {
    pub fn new(orchestrator: Orchestrator, config: &LlmConfig) -> Self {
        Self {
            inner: Arc::new(LlmStateInner {
                orchestrator,
                defaults: RequestDefaults {
                    model: config.default_model.clone(),
                    channel: config.default_channel.clone(),
                    user_id: config.default_user_id.clone(),
                },
            }),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.inner.orchestrator
    }

    /// Validate an inbound request and split it into history and context
    ///
    /// `messages` and `appId` are required; everything else falls back to
    /// the configured defaults.
    pub fn prepare(&self, request: ChatCompletionRequest) -> Result<(Vec<Message>, RequestContext), LlmError> {
        let messages = request
            .messages
            .ok_or_else(|| LlmError::InvalidRequest("'messages' is required".to_owned()))?;

        let app_id = non_blank(request.app_id)
            .ok_or_else(|| LlmError::InvalidRequest("'appId' is required".to_owned()))?;

        let defaults = &self.inner.defaults;
        let context = RequestContext::new(
            app_id,
            non_blank(request.user_id).unwrap_or_else(|| defaults.user_id.clone()),
            non_blank(request.channel).unwrap_or_else(|| defaults.channel.clone()),
            non_blank(request.model).unwrap_or_else(|| defaults.model.clone()),
        )
        .streaming(request.stream.unwrap_or(false));

        Ok((messages, context))
    }

    /// Validate and answer an inbound request
    pub async fn respond(&self, request: ChatCompletionRequest) -> Result<Completion, LlmError> {
        let (messages, context) = self.prepare(request)?;

        tracing::debug!(
            app_id = %context.app_id,
            channel = %context.channel,
            model = %context.model,
            stream = context.stream,
            "completion request"
        );

        self.inner.orchestrator.respond(messages, context).await
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//! Completion orchestration
//!
//! Assembles the prompt, dispatches to the configured backend, and runs at
//! most one function-call hop per request. The streaming path drives a
//! [`StreamNormalizer`] and splices the follow-up stream onto the output
//! when the model asks for a registered tool.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt, stream};
use parley_core::RequestContext;

use crate::backend::{Backend, BackendRequest, BackendResult, EventStream};
use crate::context::{ContextStore, assemble};
use crate::error::LlmError;
use crate::executor::{Execution, FunctionCallExecutor};
use crate::normalizer::{PendingFunctionCall, StreamNormalizer, Transition};
use crate::tools::ToolRegistry;
use crate::types::{ChunkHeader, CompletionResponse, FinishReason, Message, StreamFrame};

/// Finite, single-pass sequence of canonical frames
///
/// Ends with [`StreamFrame::Done`] on success. A mid-stream failure yields
/// one `Err` and then ends without the sentinel.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<StreamFrame, LlmError>> + Send>>;

/// Canonical output of one request
pub enum Completion {
    /// Non-streaming completion
    Complete(CompletionResponse),
    /// Streamed chunks
    Stream(FrameStream),
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete(response) => f.debug_tuple("Complete").field(response).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Request-time completion engine
///
/// Holds only process-wide, read-only collaborators. Every piece of
/// per-request state lives in the call or in the returned stream.
#[derive(Clone)]
pub struct Orchestrator {
    backend: Arc<dyn Backend>,
    tools: Arc<ToolRegistry>,
    context: Arc<dyn ContextStore>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn Backend>, tools: Arc<ToolRegistry>, context: Arc<dyn ContextStore>) -> Self {
        Self {
            backend,
            tools,
            context,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Answer a request in the mode its context asks for
    pub async fn respond(&self, messages: Vec<Message>, context: RequestContext) -> Result<Completion, LlmError> {
        let request = self.prepare(messages, &context, context.stream)?;

        match self.backend.submit(&request).await? {
            BackendResult::Complete(response) => self
                .resolve(response, request, &context)
                .await
                .map(Completion::Complete),
            BackendResult::Stream(events) => Ok(Completion::Stream(self.drive(events, request, context))),
        }
    }

    /// Produce a single canonical completion
    pub async fn complete(&self, messages: Vec<Message>, context: &RequestContext) -> Result<CompletionResponse, LlmError> {
        let request = self.prepare(messages, context, false)?;
        let response = self.backend.complete(&request).await?;
        self.resolve(response, request, context).await
    }

    /// Produce a stream of canonical chunks
    ///
    /// Errors before the first backend event are returned directly; later
    /// errors arrive inside the stream.
    pub async fn complete_stream(&self, messages: Vec<Message>, context: RequestContext) -> Result<FrameStream, LlmError> {
        let request = self.prepare(messages, &context, true)?;
        let events = self.backend.complete_stream(&request).await?;
        Ok(self.drive(events, request, context))
    }

    fn prepare(&self, messages: Vec<Message>, context: &RequestContext, stream: bool) -> Result<BackendRequest, LlmError> {
        let messages = assemble(self.context.as_ref(), messages)?;

        tracing::debug!(
            backend = self.backend.name(),
            model = %context.model,
            messages = messages.len(),
            stream,
            "submitting completion"
        );

        Ok(BackendRequest {
            model: context.model.clone(),
            messages,
            tools: self.tools.schemas(),
            stream,
        })
    }

    /// Execute a requested function call and resubmit once
    ///
    /// The follow-up response is final even if it asks for another call.
    async fn resolve(
        &self,
        response: CompletionResponse,
        request: BackendRequest,
        context: &RequestContext,
    ) -> Result<CompletionResponse, LlmError> {
        let Some(call) = FunctionCallExecutor::detect(&response) else {
            return Ok(response);
        };

        let executor = FunctionCallExecutor::new(Arc::clone(&self.tools), context.clone());
        let execution = executor.execute(call, &request.messages).await?;
        match execution {
            Execution::Unresolved(_) => Ok(response),
            Execution::FollowUp(messages) => {
                let follow_up = BackendRequest { messages, ..request };
                self.backend.complete(&follow_up).await
            }
        }
    }

    fn drive(&self, upstream: EventStream, request: BackendRequest, context: RequestContext) -> FrameStream {
        let header = ChunkHeader::new(context.model.clone());
        let driver = StreamDriver {
            upstream,
            normalizer: StreamNormalizer::new(header),
            hop: Some(FollowUpHop {
                executor: FunctionCallExecutor::new(Arc::clone(&self.tools), context),
                backend: Arc::clone(&self.backend),
                request,
            }),
            outbox: VecDeque::new(),
            closed: false,
        };

        Box::pin(stream::unfold(driver, StreamDriver::next_frame))
    }
}

/// Everything needed for the one permitted follow-up call
struct FollowUpHop {
    executor: FunctionCallExecutor,
    backend: Arc<dyn Backend>,
    request: BackendRequest,
}

/// Per-request streaming state
///
/// Dropping it, which happens when the consumer disconnects, stops reading
/// the backend and abandons any tool call in flight.
struct StreamDriver {
    upstream: EventStream,
    normalizer: StreamNormalizer,
    /// Taken on first use, so a second call can never be executed
    hop: Option<FollowUpHop>,
    outbox: VecDeque<Result<StreamFrame, LlmError>>,
    closed: bool,
}

impl StreamDriver {
    async fn next_frame(mut self) -> Option<(Result<StreamFrame, LlmError>, Self)> {
        loop {
            if let Some(frame) = self.outbox.pop_front() {
                return Some((frame, self));
            }
            if self.closed {
                return None;
            }

            let transition = match self.upstream.next().await {
                Some(Ok(event)) => self.normalizer.accept(event),
                Some(Err(e)) => {
                    self.fail(e);
                    continue;
                }
                None => self.normalizer.finish(),
            };

            match transition {
                Transition::Emit(chunk) => self.outbox.push_back(Ok(StreamFrame::Chunk(chunk))),
                Transition::Skip => {}
                Transition::Terminal(pending) => self.on_terminal(pending).await,
            }
        }
    }

    async fn on_terminal(&mut self, pending: Option<PendingFunctionCall>) {
        let Some(call) = pending.and_then(PendingFunctionCall::into_function_call) else {
            self.close(FinishReason::Stop);
            return;
        };

        let Some(hop) = self.hop.take() else {
            tracing::debug!(function = %call.name, "follow-up requested another call; not executing");
            self.close(FinishReason::FunctionCall);
            return;
        };

        let execution = hop.executor.execute(&call, &hop.request.messages).await;
        match execution {
            Ok(Execution::Unresolved(_)) => self.close(FinishReason::FunctionCall),
            Ok(Execution::FollowUp(messages)) => {
                let request = BackendRequest {
                    messages,
                    ..hop.request
                };
                match hop.backend.complete_stream(&request).await {
                    Ok(upstream) => {
                        self.upstream = upstream;
                        self.normalizer = StreamNormalizer::new(self.normalizer.header().clone());
                    }
                    Err(e) => self.fail(e),
                }
            }
            Err(e) => self.fail(e),
        }
    }

    fn close(&mut self, reason: FinishReason) {
        let chunk = self.normalizer.finish_chunk(reason);
        self.outbox.push_back(Ok(StreamFrame::Chunk(chunk)));
        self.outbox.push_back(Ok(StreamFrame::Done));
        self.closed = true;
    }

    fn fail(&mut self, error: LlmError) {
        tracing::warn!(error = %error, "completion stream failed");
        self.outbox.push_back(Err(error));
        self.closed = true;
    }
}

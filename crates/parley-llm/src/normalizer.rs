//! Stream normalizer
//!
//! A per-request state machine that turns canonical stream events from
//! either adapter into canonical chunks, accumulating a partial function
//! call along the way:
//!
//! ```text
//! AwaitingFirstEvent -> StreamingContent <-> StreamingFunctionCall -> Terminated
//! ```
//!
//! The normalizer never executes anything. On a terminal event it hands
//! the accumulated call to its owner, which decides whether to execute it
//! and splice in a follow-up stream.

use crate::types::{ChunkDelta, ChunkHeader, CompletionChunk, FinishReason, FunctionCall, FunctionCallDelta, StreamEvent};

/// Position in the stream lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizerState {
    /// Nothing received yet
    AwaitingFirstEvent,
    /// Last event carried assistant text
    StreamingContent,
    /// Last event carried function-call name or arguments
    StreamingFunctionCall,
    /// Terminal event seen; later events are ignored
    Terminated,
}

/// Function call accumulated from streamed fragments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingFunctionCall {
    /// Function name, once any name fragment has arrived
    pub name: Option<String>,
    /// Concatenated argument fragments
    pub arguments: String,
}

impl PendingFunctionCall {
    /// Completed call, or `None` when no name was ever streamed
    pub fn into_function_call(self) -> Option<FunctionCall> {
        self.name
            .filter(|name| !name.is_empty())
            .map(|name| FunctionCall::new(name, self.arguments))
    }
}

/// What the owner should do after feeding one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Forward this chunk downstream
    Emit(CompletionChunk),
    /// Nothing to forward
    Skip,
    /// Stream ended, with the accumulated function call if there was one
    Terminal(Option<PendingFunctionCall>),
}

/// Per-request stream state machine
#[derive(Debug)]
pub struct StreamNormalizer {
    header: ChunkHeader,
    state: NormalizerState,
    pending: Option<PendingFunctionCall>,
    /// A second call item began; its fragments are dropped
    extra_call: bool,
}

impl StreamNormalizer {
    pub const fn new(header: ChunkHeader) -> Self {
        Self {
            header,
            state: NormalizerState::AwaitingFirstEvent,
            pending: None,
            extra_call: false,
        }
    }

    pub const fn state(&self) -> NormalizerState {
        self.state
    }

    /// Identity stamped on every chunk this normalizer emits
    pub const fn header(&self) -> &ChunkHeader {
        &self.header
    }

    /// Feed one event
    pub fn accept(&mut self, event: StreamEvent) -> Transition {
        if self.state == NormalizerState::Terminated {
            return Transition::Skip;
        }

        match event {
            StreamEvent::ContentDelta(text) => {
                if text.is_empty() {
                    return Transition::Skip;
                }
                self.state = NormalizerState::StreamingContent;
                Transition::Emit(self.header.chunk(ChunkDelta::content(text), None))
            }
            StreamEvent::FunctionCallStarted { name, arguments } => {
                if self.extra_call || self.pending.as_ref().is_some_and(|p| p.name.is_some()) {
                    tracing::debug!(function = %name, "ignoring additional function call in stream");
                    self.extra_call = true;
                    return Transition::Skip;
                }

                let pending = self.pending.get_or_insert_with(PendingFunctionCall::default);
                pending.name = Some(name.clone());
                pending.arguments.push_str(&arguments);

                self.state = NormalizerState::StreamingFunctionCall;
                let delta = ChunkDelta {
                    content: None,
                    function_call: Some(FunctionCallDelta {
                        name: Some(name),
                        arguments: Some(arguments).filter(|a| !a.is_empty()),
                    }),
                };
                Transition::Emit(self.header.chunk(delta, None))
            }
            StreamEvent::FunctionCallDelta { .. } | StreamEvent::FunctionCallArguments(_) if self.extra_call => {
                Transition::Skip
            }
            StreamEvent::FunctionCallDelta { name, arguments } => {
                let name = name.filter(|n| !n.is_empty());
                let arguments = arguments.filter(|a| !a.is_empty());
                if name.is_none() && arguments.is_none() {
                    return Transition::Skip;
                }

                let pending = self.pending.get_or_insert_with(PendingFunctionCall::default);
                if let Some(fragment) = &name {
                    pending.name.get_or_insert_with(String::new).push_str(fragment);
                }
                if let Some(fragment) = &arguments {
                    pending.arguments.push_str(fragment);
                }

                self.state = NormalizerState::StreamingFunctionCall;
                let delta = ChunkDelta {
                    content: None,
                    function_call: Some(FunctionCallDelta { name, arguments }),
                };
                Transition::Emit(self.header.chunk(delta, None))
            }
            StreamEvent::FunctionCallArguments(arguments) => {
                self.pending
                    .get_or_insert_with(PendingFunctionCall::default)
                    .arguments = arguments;
                self.state = NormalizerState::StreamingFunctionCall;
                Transition::Skip
            }
            StreamEvent::Completed => self.finish(),
        }
    }

    /// End the stream, whether or not a terminal event was seen
    pub fn finish(&mut self) -> Transition {
        if self.state == NormalizerState::Terminated {
            return Transition::Skip;
        }
        self.state = NormalizerState::Terminated;
        Transition::Terminal(self.pending.take())
    }

    /// Empty-delta chunk carrying the finish reason
    pub fn finish_chunk(&self, reason: FinishReason) -> CompletionChunk {
        self.header.chunk(ChunkDelta::default(), Some(reason))
    }
}

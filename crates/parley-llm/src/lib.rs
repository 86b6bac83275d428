//! Completion orchestration for Parley
//!
//! Sits between a realtime conversational front-end and a model backend.
//! Two structurally different backend protocols (message-array chat
//! completions and transcript-based responses) are normalized into one
//! canonical completion and chunk shape, and a single round of function
//! calling is executed transparently when the model asks for one.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod backend;
pub mod context;
pub mod convert;
pub mod error;
pub mod executor;
pub mod formatter;
#[cfg(feature = "http")]
pub mod handler;
pub mod normalizer;
pub mod orchestrator;
pub mod protocol;
pub mod state;
pub mod tools;
pub mod types;

pub use backend::{Backend, BackendRequest, BackendResult, EventStream};
pub use context::{ContextStore, StaticContextStore, assemble};
pub use error::LlmError;
pub use executor::{Execution, FunctionCallExecutor};
pub use formatter::format_response;
#[cfg(feature = "http")]
pub use handler::llm_router;
pub use normalizer::{NormalizerState, PendingFunctionCall, StreamNormalizer};
pub use orchestrator::{Completion, FrameStream, Orchestrator};
pub use state::LlmState;
pub use tools::{Tool, ToolError, ToolRegistry};
pub use types::{
    ChatCompletionRequest, CompletionChunk, CompletionResponse, Message, StreamEvent, StreamFrame, ToolDefinition,
};

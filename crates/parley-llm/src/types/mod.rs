//! Canonical types shared by every backend
//!
//! Wire formats convert to and from these; the orchestrator never sees a
//! backend-specific shape.

pub mod message;
pub mod request;
pub mod response;
pub mod stream;
pub mod tool;

pub use message::{FunctionCall, Message, Role};
pub use request::ChatCompletionRequest;
pub use response::{Choice, ChoiceMessage, CompletionResponse, FinishReason};
pub use stream::{ChunkChoice, ChunkDelta, ChunkHeader, CompletionChunk, FunctionCallDelta, StreamEvent, StreamFrame};
pub use tool::ToolDefinition;

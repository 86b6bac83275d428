use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::response::FinishReason;

/// Backend-agnostic incremental event produced by an adapter
///
/// Adapters translate their native stream frames into these; the stream
/// normalizer turns them into canonical chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Fragment of assistant text
    ContentDelta(String),
    /// Start of a function-call output item with its full name
    ///
    /// Only the first call of a response is kept; later items and their
    /// argument events are dropped.
    FunctionCallStarted {
        /// Function name
        name: String,
        /// Arguments already present on the item, usually empty
        arguments: String,
    },
    /// Fragment of a function call's name and/or arguments
    FunctionCallDelta {
        /// Name fragment
        name: Option<String>,
        /// Arguments fragment
        arguments: Option<String>,
    },
    /// Complete arguments for the pending call, replacing accumulated fragments
    FunctionCallArguments(String),
    /// Backend signalled the end of the response
    Completed,
}

/// One frame of canonical streaming output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// Canonical chunk
    Chunk(CompletionChunk),
    /// End-of-stream sentinel
    Done,
}

impl StreamFrame {
    /// Sentinel sent as the final SSE frame
    pub const DONE: &'static str = "[DONE]";

    /// Payload of the SSE `data:` field for this frame
    pub fn sse_data(&self) -> String {
        match self {
            Self::Chunk(chunk) => serde_json::to_string(chunk).unwrap_or_else(|e| {
                tracing::error!(error = %e, chunk_id = %chunk.id, "failed to serialize chunk");
                String::new()
            }),
            Self::Done => Self::DONE.to_owned(),
        }
    }
}

/// Identity shared by every chunk of one streamed response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Response identifier
    pub id: String,
    /// Model reported to the caller
    pub model: String,
    /// Unix timestamp of creation
    pub created: u64,
}

impl ChunkHeader {
    /// Fresh identity stamped with the current time
    pub fn new(model: impl Into<String>) -> Self {
        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            id: format!("chatcmpl-{}", uuid::Uuid::new_v4().simple()),
            model: model.into(),
            created,
        }
    }

    /// Build a single-choice chunk
    pub fn chunk(&self, delta: ChunkDelta, finish_reason: Option<FinishReason>) -> CompletionChunk {
        CompletionChunk {
            id: self.id.clone(),
            object: CompletionChunk::OBJECT.to_owned(),
            created: self.created,
            model: self.model.clone(),
            choices: vec![ChunkChoice {
                index: 0,
                delta,
                finish_reason,
            }],
        }
    }
}

/// Canonical streaming chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionChunk {
    /// Response identifier, shared by all chunks of a response
    pub id: String,
    /// Object type, always `chat.completion.chunk`
    pub object: String,
    /// Unix timestamp of creation
    pub created: u64,
    /// Model used
    pub model: String,
    /// Delta choices
    pub choices: Vec<ChunkChoice>,
}

impl CompletionChunk {
    pub const OBJECT: &'static str = "chat.completion.chunk";
}

/// Choice within a streaming chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// Choice index
    pub index: u32,
    /// Incremental delta
    pub delta: ChunkDelta,
    /// Finish reason, `null` until the final chunk
    pub finish_reason: Option<FinishReason>,
}

/// Delta content within a streaming choice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDelta {
    /// Incremental text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Incremental function call data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallDelta>,
}

impl ChunkDelta {
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            function_call: None,
        }
    }
}

/// Partial function call within a streaming delta
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCallDelta {
    /// Name fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Arguments fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_share_header_identity() {
        let header = ChunkHeader::new("gpt-4o-mini");
        let a = header.chunk(ChunkDelta::content("a"), None);
        let b = header.chunk(ChunkDelta::default(), Some(FinishReason::Stop));
        assert_eq!(a.id, b.id);
        assert!(a.id.starts_with("chatcmpl-"));
        assert_eq!(a.object, "chat.completion.chunk");
    }

    #[test]
    fn open_chunk_serializes_null_finish_reason() {
        let header = ChunkHeader::new("m");
        let json = serde_json::to_value(header.chunk(ChunkDelta::content("hi"), None)).unwrap();
        assert!(json["choices"][0]["finish_reason"].is_null());
        assert_eq!(json["choices"][0]["delta"]["content"], "hi");
        assert!(json["choices"][0]["delta"].get("function_call").is_none());
    }

    #[test]
    fn chunk_frame_is_chunk_json() {
        let chunk = ChunkHeader::new("m").chunk(ChunkDelta::content("hi"), None);
        let data = StreamFrame::Chunk(chunk.clone()).sse_data();
        assert!(!data.is_empty());
        assert_eq!(serde_json::from_str::<CompletionChunk>(&data).unwrap(), chunk);
    }

    #[test]
    fn done_frame_is_sentinel() {
        assert_eq!(StreamFrame::Done.sse_data(), "[DONE]");
    }
}

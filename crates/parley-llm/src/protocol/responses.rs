//! Responses API wire format (transcript protocol with typed stream events)

use serde::{Deserialize, Serialize};

// -- Request types --

/// Responses API request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesRequest {
    /// Model identifier
    pub model: String,
    /// System instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Flattened conversation transcript
    pub input: String,
    /// Function tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ResponsesTool>>,
    /// Whether to stream the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// Function tool definition (flat, unlike the chat `functions` shape)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesTool {
    /// Always `function`
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function name
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for parameters
    pub parameters: serde_json::Value,
}

// -- Response types --

/// Terminal response object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponsesResponse {
    /// Response identifier
    #[serde(default)]
    pub id: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<u64>,
    /// Model used
    #[serde(default)]
    pub model: String,
    /// Lifecycle status (`completed`, `failed`, ...)
    #[serde(default)]
    pub status: Option<String>,
    /// Output items in generation order
    #[serde(default)]
    pub output: Vec<ResponsesOutputItem>,
    /// Convenience concatenation of all output text
    #[serde(default)]
    pub output_text: Option<String>,
}

/// Item within the response output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsesOutputItem {
    /// Assistant message
    Message {
        /// Message role
        #[serde(default)]
        role: Option<String>,
        /// String or typed fragments
        #[serde(default)]
        content: Option<ResponsesMessageContent>,
    },
    /// Function call request
    FunctionCall {
        /// Call identifier
        #[serde(default)]
        call_id: Option<String>,
        /// Function name
        #[serde(default)]
        name: String,
        /// JSON-encoded arguments
        #[serde(default)]
        arguments: String,
    },
    /// Reasoning, web search, and other item kinds
    #[serde(other)]
    Other,
}

/// Message content, a plain string or typed fragments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponsesMessageContent {
    /// Plain text
    Text(String),
    /// Typed fragments such as `output_text`
    Parts(Vec<ResponsesContentPart>),
}

/// Typed content fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesContentPart {
    /// Fragment type (`output_text`, `refusal`, ...)
    #[serde(rename = "type", default)]
    pub part_type: String,
    /// Text, when the fragment carries any
    #[serde(default)]
    pub text: Option<String>,
}

// -- Streaming types --

/// Typed stream event, dispatched on its `type` field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResponsesStreamEvent {
    /// Text fragment
    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta {
        /// Fragment
        delta: String,
    },
    /// New output item; function-call items carry the function name
    #[serde(rename = "response.output_item.added")]
    OutputItemAdded {
        /// The item as known so far
        item: ResponsesOutputItem,
    },
    /// Arguments fragment for the current function call
    #[serde(rename = "response.function_call_arguments.delta")]
    FunctionCallArgumentsDelta {
        /// Fragment
        delta: String,
    },
    /// Complete arguments for the current function call
    #[serde(rename = "response.function_call_arguments.done")]
    FunctionCallArgumentsDone {
        /// Full arguments JSON
        arguments: String,
    },
    /// Terminal event
    #[serde(rename = "response.completed")]
    Completed {
        /// Final response object, not needed once the stream has been read
        #[serde(default)]
        response: Option<serde_json::Value>,
    },
    /// Backend gave up on the response
    #[serde(rename = "response.failed")]
    Failed {
        /// Response object carrying the error detail
        #[serde(default)]
        response: Option<serde_json::Value>,
    },
    /// Stream-level error
    #[serde(rename = "error")]
    Error {
        /// Error message
        #[serde(default)]
        message: Option<String>,
        /// Error code
        #[serde(default)]
        code: Option<String>,
    },
    /// Any event type this gateway does not interpret
    #[serde(other)]
    Unknown,
}

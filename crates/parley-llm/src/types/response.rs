use serde::{Deserialize, Serialize};

use super::message::{FunctionCall, Role};

/// Reason the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of generation
    Stop,
    /// Model asked for a function call
    FunctionCall,
}

/// Canonical non-streaming completion
///
/// Identical in shape whichever backend produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Response identifier
    pub id: String,
    /// Object type, always `chat.completion`
    pub object: String,
    /// Unix timestamp of creation
    pub created: u64,
    /// Model used for generation
    pub model: String,
    /// Generated choices
    pub choices: Vec<Choice>,
}

impl CompletionResponse {
    pub const OBJECT: &'static str = "chat.completion";

    /// Single-choice completion
    pub fn single(id: impl Into<String>, model: impl Into<String>, created: u64, choice: Choice) -> Self {
        Self {
            id: id.into(),
            object: Self::OBJECT.to_owned(),
            created,
            model: model.into(),
            choices: vec![choice],
        }
    }

    /// Function call requested by the first choice, if any
    pub fn function_call(&self) -> Option<&FunctionCall> {
        self.choices.first().and_then(|c| c.message.function_call.as_ref())
    }

    /// Text content of the first choice
    pub fn content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.message.content.as_deref())
    }
}

/// A single completion choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Index of this choice
    pub index: u32,
    /// Generated message
    pub message: ChoiceMessage,
    /// Why generation stopped
    pub finish_reason: FinishReason,
}

impl Choice {
    /// Plain text answer
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            index: 0,
            message: ChoiceMessage {
                role: Role::Assistant,
                content: Some(content.into()),
                function_call: None,
            },
            finish_reason: FinishReason::Stop,
        }
    }

    /// Function call with no visible content
    pub fn calling(call: FunctionCall) -> Self {
        Self {
            index: 0,
            message: ChoiceMessage {
                role: Role::Assistant,
                content: None,
                function_call: Some(call),
            },
            finish_reason: FinishReason::FunctionCall,
        }
    }
}

/// Message within a response choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    /// Always assistant for completions
    pub role: Role,
    /// Text content, `null` when the model called a function
    pub content: Option<String>,
    /// Function call requested by the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

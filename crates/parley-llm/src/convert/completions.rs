//! Conversion between canonical types and the chat completions wire format

use crate::backend::BackendRequest;
use crate::protocol::completions::{
    ChatChunk, ChatFunction, ChatFunctionCall, ChatMessage, ChatRequest, ChatResponse,
};
use crate::types::{Choice, CompletionResponse, FunctionCall, Message, Role, StreamEvent};

// -- Outbound: canonical request -> chat wire request --

impl From<&BackendRequest> for ChatRequest {
    fn from(req: &BackendRequest) -> Self {
        let functions = (!req.tools.is_empty()).then(|| {
            req.tools
                .iter()
                .map(|t| ChatFunction {
                    name: t.name.clone(),
                    description: Some(t.description.clone()).filter(|d| !d.is_empty()),
                    parameters: t.parameters.clone(),
                })
                .collect::<Vec<_>>()
        });

        Self {
            model: req.model.clone(),
            messages: req.messages.iter().map(Into::into).collect(),
            function_call: functions.as_ref().map(|_| "auto".to_owned()),
            functions,
            stream: req.stream.then_some(true),
        }
    }
}

impl From<&Message> for ChatMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Function => "function",
        };

        // Function results carry only the name and content; the call they
        // answer stays in canonical history for transcript backends.
        let function_call = match msg.role {
            Role::Function => None,
            _ => msg.function_call.as_ref().map(|fc| ChatFunctionCall {
                name: fc.name.clone(),
                arguments: fc.arguments.clone(),
            }),
        };

        Self {
            role: role.to_owned(),
            content: msg.content.clone(),
            name: msg.name.clone(),
            function_call,
        }
    }
}

// -- Inbound: chat wire response -> canonical completion --

impl From<ChatResponse> for CompletionResponse {
    fn from(resp: ChatResponse) -> Self {
        let message = resp.choices.into_iter().next().map(|c| c.message);

        let choice = match message {
            Some(msg) => match msg.function_call {
                Some(fc) => Choice::calling(FunctionCall::new(fc.name, fc.arguments)),
                None => Choice::text(msg.content.unwrap_or_default()),
            },
            None => Choice::text(String::new()),
        };

        Self::single(resp.id, resp.model, resp.created, choice)
    }
}

/// Translate one streaming chunk into canonical stream events
///
/// Only the first choice is read. A `finish_reason` does not end the stream
/// here; the `[DONE]` sentinel or end of body does.
pub fn chunk_to_events(chunk: &ChatChunk) -> Vec<StreamEvent> {
    let Some(choice) = chunk.choices.first() else {
        return Vec::new();
    };

    let mut events = Vec::new();

    if let Some(content) = &choice.delta.content
        && !content.is_empty()
    {
        events.push(StreamEvent::ContentDelta(content.clone()));
    }

    if let Some(fc) = &choice.delta.function_call
        && (fc.name.is_some() || fc.arguments.is_some())
    {
        events.push(StreamEvent::FunctionCallDelta {
            name: fc.name.clone(),
            arguments: fc.arguments.clone(),
        });
    }

    events
}

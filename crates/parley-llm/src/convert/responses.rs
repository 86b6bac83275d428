//! Conversion between canonical types and the responses wire format
//!
//! The responses protocol has no message array. History is flattened into a
//! plain-text transcript, system messages travel separately as
//! `instructions`, and streamed output arrives as typed events that are
//! interpreted one by one.

use crate::backend::BackendRequest;
use crate::error::LlmError;
use crate::protocol::responses::{ResponsesOutputItem, ResponsesRequest, ResponsesStreamEvent, ResponsesTool};
use crate::types::{Message, Role, StreamEvent};

impl From<&BackendRequest> for ResponsesRequest {
    fn from(req: &BackendRequest) -> Self {
        let (instructions, input) = flatten_transcript(&req.messages);

        let tools = (!req.tools.is_empty()).then(|| {
            req.tools
                .iter()
                .map(|t| ResponsesTool {
                    tool_type: "function".to_owned(),
                    name: t.name.clone(),
                    description: Some(t.description.clone()).filter(|d| !d.is_empty()),
                    parameters: t.parameters.clone(),
                })
                .collect()
        });

        Self {
            model: req.model.clone(),
            instructions,
            input,
            tools,
            stream: req.stream.then_some(true),
        }
    }
}

/// Split history into `instructions` and a `Role: content` transcript
///
/// A synthetic function message expands into two lines, the call and its
/// result, so the model sees what it asked for and what came back.
pub fn flatten_transcript(messages: &[Message]) -> (Option<String>, String) {
    let mut instructions = Vec::new();
    let mut lines = Vec::new();

    for msg in messages {
        let content = msg.content.as_deref().unwrap_or_default();

        match msg.role {
            Role::System => instructions.push(content),
            Role::User => lines.push(format!("User: {content}")),
            Role::Assistant => match &msg.function_call {
                Some(call) if content.is_empty() => lines.push(format!(
                    "Assistant called function {} with arguments {}",
                    call.name, call.arguments
                )),
                _ => lines.push(format!("Assistant: {content}")),
            },
            Role::Function => {
                let name = msg
                    .name
                    .as_deref()
                    .or_else(|| msg.function_call.as_ref().map(|c| c.name.as_str()))
                    .unwrap_or("unknown");

                if let Some(call) = &msg.function_call {
                    lines.push(format!(
                        "Assistant called function {} with arguments {}",
                        call.name, call.arguments
                    ));
                }
                lines.push(format!("Function {name} returned: {content}"));
            }
        }
    }

    let instructions = (!instructions.is_empty()).then(|| instructions.join("\n\n"));
    (instructions, lines.join("\n"))
}

/// Interpret one typed stream event
///
/// Returns `Ok(None)` for events that carry nothing canonical, including
/// event types this gateway does not know about.
pub fn interpret_event(event: ResponsesStreamEvent) -> Result<Option<StreamEvent>, LlmError> {
    let interpreted = match event {
        ResponsesStreamEvent::OutputTextDelta { delta } => Some(StreamEvent::ContentDelta(delta)),
        ResponsesStreamEvent::OutputItemAdded {
            item: ResponsesOutputItem::FunctionCall { name, arguments, .. },
        } => Some(StreamEvent::FunctionCallStarted { name, arguments }),
        ResponsesStreamEvent::FunctionCallArgumentsDelta { delta } => Some(StreamEvent::FunctionCallDelta {
            name: None,
            arguments: Some(delta),
        }),
        ResponsesStreamEvent::FunctionCallArgumentsDone { arguments } => {
            Some(StreamEvent::FunctionCallArguments(arguments))
        }
        ResponsesStreamEvent::Completed { .. } => Some(StreamEvent::Completed),
        ResponsesStreamEvent::Failed { response } => {
            let message = response
                .as_ref()
                .and_then(|r| r.pointer("/error/message"))
                .and_then(serde_json::Value::as_str)
                .unwrap_or("response failed");
            return Err(LlmError::Streaming(message.to_owned()));
        }
        ResponsesStreamEvent::Error { message, code } => {
            let message = message.unwrap_or_else(|| "backend stream error".to_owned());
            let message = match code {
                Some(code) => format!("{code}: {message}"),
                None => message,
            };
            return Err(LlmError::Streaming(message));
        }
        ResponsesStreamEvent::OutputItemAdded { .. } | ResponsesStreamEvent::Unknown => {
            tracing::trace!("ignoring stream event");
            None
        }
    };

    Ok(interpreted)
}

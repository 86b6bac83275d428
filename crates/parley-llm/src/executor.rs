//! Function-call detection and execution

use std::sync::Arc;
use std::time::Instant;

use parley_core::RequestContext;
use serde_json::Value;

use crate::error::LlmError;
use crate::tools::{ToolError, ToolRegistry};
use crate::types::{CompletionResponse, FunctionCall, Message};

/// Outcome of handling a function call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// Tool ran; the conversation to resubmit, ending with its result
    FollowUp(Vec<Message>),
    /// No tool is registered under the requested name
    Unresolved(FunctionCall),
}

/// Executes the model's function call against the tool registry
///
/// Owns its request context so it can live inside a `'static` output stream.
#[derive(Debug, Clone)]
pub struct FunctionCallExecutor {
    tools: Arc<ToolRegistry>,
    context: RequestContext,
}

impl FunctionCallExecutor {
    pub const fn new(tools: Arc<ToolRegistry>, context: RequestContext) -> Self {
        Self { tools, context }
    }

    /// Function call requested by a terminal response, if any
    pub fn detect(response: &CompletionResponse) -> Option<&FunctionCall> {
        response.function_call()
    }

    /// Run the call and build the follow-up conversation
    ///
    /// An unregistered tool is not an error: the caller gets the call back
    /// unexecuted. Malformed arguments and tool failures fail the request.
    pub async fn execute(&self, call: &FunctionCall, messages: &[Message]) -> Result<Execution, LlmError> {
        let Some(tool) = self.tools.lookup(&call.name) else {
            tracing::warn!(function = %call.name, "model requested an unregistered tool");
            return Ok(Execution::Unresolved(call.clone()));
        };

        let arguments = parse_arguments(call)?;

        let start = Instant::now();
        let result = tool
            .call(&self.context.app_id, &self.context.user_id, &self.context.channel, arguments)
            .await
            .map_err(|e| {
                tracing::warn!(function = %call.name, error = %e, "tool execution failed");
                match e {
                    ToolError::InvalidArguments(message) => LlmError::InvalidFunctionArguments {
                        name: call.name.clone(),
                        message,
                    },
                    ToolError::Failed(message) => LlmError::ToolFailed {
                        name: call.name.clone(),
                        message,
                    },
                }
            })?;

        tracing::info!(
            function = %call.name,
            app_id = %self.context.app_id,
            channel = %self.context.channel,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "executed function call"
        );

        let mut follow_up = Vec::with_capacity(messages.len() + 1);
        follow_up.extend_from_slice(messages);
        follow_up.push(Message::function_result(call.clone(), result));
        Ok(Execution::FollowUp(follow_up))
    }
}

/// Decode the call's arguments; blank arguments mean no arguments
fn parse_arguments(call: &FunctionCall) -> Result<Value, LlmError> {
    let raw = call.arguments.trim();
    if raw.is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    serde_json::from_str(raw).map_err(|e| LlmError::InvalidFunctionArguments {
        name: call.name.clone(),
        message: e.to_string(),
    })
}

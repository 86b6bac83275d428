//! Canonical formatting of terminal responses-protocol objects
//!
//! Chat completions responses are already canonical in shape and convert
//! directly; only the responses protocol needs content extraction.

use thiserror::Error;

use crate::protocol::responses::{ResponsesMessageContent, ResponsesOutputItem, ResponsesResponse};
use crate::types::{Choice, CompletionResponse, FunctionCall};

/// Internal inconsistency in a terminal response
#[derive(Debug, Error)]
enum FormattingError {
    #[error("function call item at output index {0} has no name")]
    UnnamedFunctionCall(usize),
}

/// Convert a terminal responses object into a canonical completion
///
/// Content is taken from the first rule that matches:
///
/// 1. a function-call output item (`finish_reason = function_call`, `content = null`)
/// 2. an assistant message with string content
/// 3. an assistant message with typed fragments, text concatenated in order
/// 4. the top-level `output_text`
/// 5. empty content
///
/// Never fails. An inconsistent response yields a placeholder completion
/// whose content explains the problem.
pub fn format_response(response: &ResponsesResponse) -> CompletionResponse {
    let choice = match extract_choice(response) {
        Ok(choice) => choice,
        Err(e) => {
            tracing::warn!(response_id = %response.id, error = %e, "malformed backend response");
            Choice::text(format!("unable to format backend response: {e}"))
        }
    };

    CompletionResponse::single(
        response.id.clone(),
        response.model.clone(),
        response.created_at.unwrap_or(0),
        choice,
    )
}

fn extract_choice(response: &ResponsesResponse) -> Result<Choice, FormattingError> {
    for (index, item) in response.output.iter().enumerate() {
        if let ResponsesOutputItem::FunctionCall { name, arguments, .. } = item {
            if name.is_empty() {
                return Err(FormattingError::UnnamedFunctionCall(index));
            }
            let arguments = if arguments.trim().is_empty() { "{}" } else { arguments };
            return Ok(Choice::calling(FunctionCall::new(name.clone(), arguments)));
        }
    }

    let assistant_content = || {
        response.output.iter().filter_map(|item| match item {
            ResponsesOutputItem::Message { role, content: Some(content) }
                if role.as_deref().is_none_or(|r| r == "assistant") =>
            {
                Some(content)
            }
            _ => None,
        })
    };

    if let Some(text) = assistant_content().find_map(|c| match c {
        ResponsesMessageContent::Text(text) => Some(text.clone()),
        ResponsesMessageContent::Parts(_) => None,
    }) {
        return Ok(Choice::text(text));
    }

    if let Some(text) = assistant_content().find_map(|c| match c {
        ResponsesMessageContent::Parts(parts) => {
            let mut texts = parts.iter().filter_map(|p| p.text.as_deref()).peekable();
            texts.peek().is_some().then(|| texts.collect::<String>())
        }
        ResponsesMessageContent::Text(_) => None,
    }) {
        return Ok(Choice::text(text));
    }

    if let Some(text) = response.output_text.as_deref().filter(|t| !t.is_empty()) {
        return Ok(Choice::text(text));
    }

    Ok(Choice::text(String::new()))
}

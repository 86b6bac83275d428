//! Axum route handlers for the chat completions endpoint

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use futures_util::{Stream, StreamExt};
use parley_core::HttpError;

use crate::error::LlmError;
use crate::orchestrator::{Completion, FrameStream};
use crate::state::LlmState;
use crate::types::ChatCompletionRequest;

/// Build the completion router
pub fn llm_router(state: LlmState) -> Router {
    Router::new()
        .route("/chat/completions", routing::post(chat_completions))
        .route("/v1/chat/completions", routing::post(chat_completions))
        .with_state(state)
}

/// Handle `POST /chat/completions`
async fn chat_completions(
    State(state): State<LlmState>,
    body: Result<Json<ChatCompletionRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return error_response(&LlmError::InvalidRequest(rejection.body_text())),
    };

    match state.respond(request).await {
        Ok(Completion::Complete(response)) => Json(response).into_response(),
        Ok(Completion::Stream(stream)) => sse_response(stream).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, status = %e.status_code(), "completion failed");
            error_response(&e)
        }
    }
}

/// Frame canonical output as server-sent events
///
/// Every chunk becomes one `data:` frame and the stream ends with
/// `data: [DONE]`. A failure mid-stream is sent as an `error` event and the
/// stream closes without the sentinel.
fn sse_response(stream: FrameStream) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let events = stream.map(|result| match result {
        Ok(frame) => Ok(Event::default().data(frame.sse_data())),
        Err(e) => Ok(Event::default().event("error").data(error_body(&e).to_string())),
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn error_body(error: &LlmError) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "message": error.client_message(),
            "type": error.error_type(),
            "code": serde_json::Value::Null,
        }
    })
}

/// Convert an error to a JSON error response
fn error_response(error: &LlmError) -> Response {
    (error.status_code(), Json(error_body(error))).into_response()
}

//! Mock model backend for integration tests
//!
//! Serves both the chat completions and the responses protocol, streaming
//! or not, from a script of turns. Each request consumes the next turn;
//! once the script runs out every request gets the default greeting.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Text returned once the script is exhausted
pub const DEFAULT_TEXT: &str = "Hello from the mock backend";

const CREATED: u64 = 1_700_000_000;

/// One scripted model turn
#[derive(Debug, Clone)]
pub enum Turn {
    /// Plain assistant text
    Text(String),
    /// Function call with raw JSON arguments
    Call { name: String, arguments: String },
}

impl Turn {
    pub fn text(content: &str) -> Self {
        Self::Text(content.to_owned())
    }

    pub fn call(name: &str, arguments: &str) -> Self {
        Self::Call {
            name: name.to_owned(),
            arguments: arguments.to_owned(),
        }
    }
}

/// Mock backend that replays a script of turns
pub struct MockBackend {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    script: Mutex<VecDeque<Turn>>,
    requests: Mutex<Vec<Value>>,
    deliveries: Mutex<Vec<Value>>,
    fail_status: Option<StatusCode>,
}

impl MockBackend {
    /// Start a mock that answers with the given turns in order
    pub async fn start(script: Vec<Turn>) -> anyhow::Result<Self> {
        Self::start_inner(script, None).await
    }

    /// Start a mock that rejects every completion with `status`
    pub async fn start_failing(status: StatusCode) -> anyhow::Result<Self> {
        Self::start_inner(Vec::new(), Some(status)).await
    }

    async fn start_inner(script: Vec<Turn>, fail_status: Option<StatusCode>) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            deliveries: Mutex::new(Vec::new()),
            fail_status,
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .route("/v1/responses", routing::post(handle_responses))
            .route("/webhook/photos", routing::post(handle_photo_delivery))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as a backend
    ///
    /// Includes `/v1` since the adapters append `/chat/completions` or `/responses`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// URL of the photo delivery webhook
    pub fn webhook_url(&self) -> String {
        format!("http://{}/webhook/photos", self.addr)
    }

    /// Bodies of every completion request received, in order
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Number of completion requests received
    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Bodies posted to the photo webhook
    pub fn deliveries(&self) -> Vec<Value> {
        self.state.deliveries.lock().unwrap().clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl MockState {
    /// Record the request and pick the turn to answer with
    fn accept(&self, body: Value) -> Result<(Turn, bool, String), Response> {
        let stream = body["stream"].as_bool().unwrap_or(false);
        let model = body["model"].as_str().unwrap_or("mock-model").to_owned();
        self.requests.lock().unwrap().push(body);

        if let Some(status) = self.fail_status {
            let error = json!({
                "error": {"message": "mock backend intentional failure", "type": "server_error"}
            });
            return Err((status, Json(error)).into_response());
        }

        let turn = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Turn::text(DEFAULT_TEXT));

        Ok((turn, stream, model))
    }
}

// -- Chat completions protocol --

async fn handle_chat_completions(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let (turn, stream, model) = match state.accept(body) {
        Ok(accepted) => accepted,
        Err(response) => return response,
    };

    if stream {
        return sse(chat_stream_body(&turn, &model));
    }

    let (message, finish_reason) = match turn {
        Turn::Text(text) => (json!({"role": "assistant", "content": text}), "stop"),
        Turn::Call { name, arguments } => (
            json!({
                "role": "assistant",
                "content": null,
                "function_call": {"name": name, "arguments": arguments}
            }),
            "function_call",
        ),
    };

    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "created": CREATED,
        "model": model,
        "choices": [{"index": 0, "message": message, "finish_reason": finish_reason}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }))
    .into_response()
}

fn chat_chunk(model: &str, delta: &Value, finish_reason: Option<&str>) -> String {
    let chunk = json!({
        "id": "chatcmpl-mock-stream",
        "object": "chat.completion.chunk",
        "created": CREATED,
        "model": model,
        "choices": [{"index": 0, "delta": delta, "finish_reason": finish_reason}]
    });
    format!("data: {chunk}\n\n")
}

fn chat_stream_body(turn: &Turn, model: &str) -> String {
    let mut body = chat_chunk(model, &json!({"role": "assistant", "content": ""}), None);

    match turn {
        Turn::Text(text) => {
            for piece in text.split_inclusive(' ') {
                body.push_str(&chat_chunk(model, &json!({"content": piece}), None));
            }
            body.push_str(&chat_chunk(model, &json!({}), Some("stop")));
        }
        Turn::Call { name, arguments } => {
            body.push_str(&chat_chunk(
                model,
                &json!({"function_call": {"name": name, "arguments": ""}}),
                None,
            ));
            for piece in fragments(arguments) {
                body.push_str(&chat_chunk(model, &json!({"function_call": {"arguments": piece}}), None));
            }
            body.push_str(&chat_chunk(model, &json!({}), Some("function_call")));
        }
    }

    body.push_str("data: [DONE]\n\n");
    body
}

// -- Responses protocol --

async fn handle_responses(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let (turn, stream, model) = match state.accept(body) {
        Ok(accepted) => accepted,
        Err(response) => return response,
    };

    if stream {
        return sse(responses_stream_body(&turn, &model));
    }

    Json(response_object(&turn, &model)).into_response()
}

fn output_item(turn: &Turn) -> Value {
    match turn {
        Turn::Text(text) => json!({
            "type": "message",
            "id": "msg_mock",
            "role": "assistant",
            "status": "completed",
            "content": [{"type": "output_text", "text": text, "annotations": []}]
        }),
        Turn::Call { name, arguments } => json!({
            "type": "function_call",
            "id": "fc_mock",
            "call_id": "call_mock",
            "name": name,
            "arguments": arguments,
            "status": "completed"
        }),
    }
}

fn response_object(turn: &Turn, model: &str) -> Value {
    let output_text = match turn {
        Turn::Text(text) => text.clone(),
        Turn::Call { .. } => String::new(),
    };

    json!({
        "id": "resp_mock",
        "object": "response",
        "created_at": CREATED,
        "model": model,
        "status": "completed",
        "output": [output_item(turn)],
        "output_text": output_text
    })
}

fn responses_event(event: &Value) -> String {
    let event_type = event["type"].as_str().unwrap_or("unknown");
    format!("event: {event_type}\ndata: {event}\n\n")
}

fn responses_stream_body(turn: &Turn, model: &str) -> String {
    let mut body = responses_event(&json!({
        "type": "response.created",
        "response": {"id": "resp_mock", "status": "in_progress", "model": model}
    }));

    match turn {
        Turn::Text(text) => {
            body.push_str(&responses_event(&json!({
                "type": "response.output_item.added",
                "output_index": 0,
                "item": {"type": "message", "id": "msg_mock", "role": "assistant", "content": []}
            })));
            for piece in text.split_inclusive(' ') {
                body.push_str(&responses_event(&json!({
                    "type": "response.output_text.delta",
                    "item_id": "msg_mock",
                    "output_index": 0,
                    "content_index": 0,
                    "delta": piece
                })));
            }
            body.push_str(&responses_event(&json!({
                "type": "response.output_text.done",
                "item_id": "msg_mock",
                "text": text
            })));
        }
        Turn::Call { name, arguments } => {
            body.push_str(&responses_event(&json!({
                "type": "response.output_item.added",
                "output_index": 0,
                "item": {"type": "function_call", "id": "fc_mock", "call_id": "call_mock",
                         "name": name, "arguments": ""}
            })));
            for piece in fragments(arguments) {
                body.push_str(&responses_event(&json!({
                    "type": "response.function_call_arguments.delta",
                    "item_id": "fc_mock",
                    "output_index": 0,
                    "delta": piece
                })));
            }
            body.push_str(&responses_event(&json!({
                "type": "response.function_call_arguments.done",
                "item_id": "fc_mock",
                "output_index": 0,
                "arguments": arguments
            })));
        }
    }

    body.push_str(&responses_event(&json!({
        "type": "response.completed",
        "response": response_object(turn, model)
    })));
    body
}

// -- Photo webhook --

async fn handle_photo_delivery(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> StatusCode {
    state.deliveries.lock().unwrap().push(body);
    StatusCode::OK
}

// -- Helpers --

/// Split a string into small pieces to exercise fragment accumulation
fn fragments(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    chars.chunks(6).map(|c| c.iter().collect()).collect()
}

fn sse(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

use std::time::Duration;

use async_trait::async_trait;
use parley_llm::{Tool, ToolDefinition, ToolError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::Url;

/// Timeout for webhook delivery
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends a photo to the caller's realtime channel
///
/// Delivery goes through an optional webhook. Without one the photo is only
/// logged, which keeps local setups working.
#[derive(Debug, Clone)]
pub struct SendPhoto {
    client: reqwest::Client,
    webhook_url: Option<Url>,
}

impl SendPhoto {
    pub const NAME: &'static str = "send_photo";

    pub fn new(webhook_url: Option<Url>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, webhook_url }
    }
}

#[derive(Debug, Deserialize)]
struct Arguments {
    url: String,
}

/// Body posted to the webhook
#[derive(Debug, Serialize)]
struct Delivery<'a> {
    app_id: &'a str,
    user_id: &'a str,
    channel: &'a str,
    url: &'a str,
}

#[async_trait]
impl Tool for SendPhoto {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_owned(),
            description: "Send a photo to the user in their current channel".to_owned(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "Public URL of the photo"
                    }
                },
                "required": ["url"]
            }),
        }
    }

    async fn call(&self, app_id: &str, user_id: &str, channel: &str, arguments: Value) -> Result<String, ToolError> {
        let Arguments { url } =
            serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        if let Some(webhook) = &self.webhook_url {
            let delivery = Delivery {
                app_id,
                user_id,
                channel,
                url: &url,
            };

            let response = self
                .client
                .post(webhook.clone())
                .json(&delivery)
                .send()
                .await
                .map_err(|e| ToolError::Failed(format!("photo delivery failed: {e}")))?;

            if !response.status().is_success() {
                return Err(ToolError::Failed(format!(
                    "photo webhook returned {}",
                    response.status()
                )));
            }
        }

        tracing::info!(app_id, user_id, channel, url = %url, "photo sent");
        Ok(format!("Photo sent to {user_id} in channel {channel}."))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    use super::*;

    async fn webhook(status: StatusCode) -> (Url, Arc<Mutex<Vec<Value>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        let app = Router::new().route(
            "/photos",
            post(move |Json(body): Json<Value>| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock().await.push(body);
                    status
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (Url::parse(&format!("http://{addr}/photos")).unwrap(), received)
    }

    #[tokio::test]
    async fn without_webhook_only_reports() {
        let out = SendPhoto::new(None)
            .call("app", "u1", "room", json!({"url": "x"}))
            .await
            .unwrap();
        assert_eq!(out, "Photo sent to u1 in channel room.");
    }

    #[tokio::test]
    async fn webhook_receives_delivery() {
        let (url, received) = webhook(StatusCode::OK).await;

        SendPhoto::new(Some(url))
            .call("app", "u1", "room", json!({"url": "https://img/1.jpg"}))
            .await
            .unwrap();

        let received = received.lock().await;
        assert_eq!(
            received.as_slice(),
            [json!({"app_id": "app", "user_id": "u1", "channel": "room", "url": "https://img/1.jpg"})]
        );
    }

    #[tokio::test]
    async fn webhook_failure_is_reported() {
        let (url, _) = webhook(StatusCode::SERVICE_UNAVAILABLE).await;

        let err = SendPhoto::new(Some(url))
            .call("app", "u1", "room", json!({"url": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Failed(ref m) if m.contains("503")));
    }

    #[tokio::test]
    async fn url_is_required() {
        let err = SendPhoto::new(None).call("app", "u1", "room", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}

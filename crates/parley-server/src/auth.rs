use std::sync::Arc;

use axum::Json;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use parley_config::AuthConfig;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

/// Static bearer token check
pub struct BearerAuth {
    token: SecretString,
    public_paths: Vec<String>,
}

impl BearerAuth {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            token: config.token.clone(),
            public_paths: config.public_paths.clone(),
        }
    }

    fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| path.starts_with(p.as_str()))
    }

    /// Compare in constant time; only the length check can short-circuit
    fn accepts(&self, presented: &str) -> bool {
        let expected = self.token.expose_secret().as_bytes();
        let presented = presented.as_bytes();
        expected.len() == presented.len() && bool::from(expected.ct_eq(presented))
    }
}

/// Reject requests without the configured bearer token
///
/// Public paths such as the health check skip the check.
pub async fn auth_middleware(auth: Arc<BearerAuth>, request: Request, next: Next) -> Response {
    if auth.is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(token) if auth.accepts(token) => next.run(request).await,
        Some(_) => unauthorized("invalid bearer token"),
        None => unauthorized("missing bearer token"),
    }
}

fn unauthorized(message: &str) -> Response {
    tracing::warn!(reason = message, "request rejected");
    let body = serde_json::json!({
        "error": {
            "message": message,
            "type": "authentication_error",
            "code": serde_json::Value::Null,
        }
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

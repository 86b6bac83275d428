use serde::{Deserialize, Serialize};

use super::message::Message;

/// Inbound request body from the realtime front-end
///
/// Every field is optional at the wire level so that a missing `messages`
/// or `appId` surfaces as a caller error rather than a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCompletionRequest {
    /// Conversation so far, oldest first
    #[serde(default)]
    pub messages: Option<Vec<Message>>,
    /// Model override
    #[serde(default)]
    pub model: Option<String>,
    /// Whether to stream the response as SSE
    #[serde(default)]
    pub stream: Option<bool>,
    /// Realtime channel
    #[serde(default)]
    pub channel: Option<String>,
    /// End user
    #[serde(default, alias = "user_id")]
    pub user_id: Option<String>,
    /// Application
    #[serde(default, alias = "app_id")]
    pub app_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_identity_fields() {
        let req: ChatCompletionRequest = serde_json::from_str(
            r#"{"messages":[{"role":"user","content":"Hello!"}],"userId":"u1","appId":"a1","channel":"c1"}"#,
        )
        .unwrap();
        assert_eq!(req.user_id.as_deref(), Some("u1"));
        assert_eq!(req.app_id.as_deref(), Some("a1"));
        assert_eq!(req.messages.unwrap().len(), 1);
    }

    #[test]
    fn snake_case_aliases_are_accepted() {
        let req: ChatCompletionRequest = serde_json::from_str(r#"{"user_id":"u2","app_id":"a2"}"#).unwrap();
        assert_eq!(req.user_id.as_deref(), Some("u2"));
        assert_eq!(req.app_id.as_deref(), Some("a2"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let req: ChatCompletionRequest =
            serde_json::from_str(r#"{"appId":"a","temperature":0.2,"stream":true}"#).unwrap();
        assert_eq!(req.stream, Some(true));
    }
}

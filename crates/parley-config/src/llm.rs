use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Upstream model backend configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Which completion protocol the backend speaks
    #[serde(default)]
    pub backend: BackendType,
    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override (must include the version segment, e.g. `/v1`)
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Model used when the caller does not name one
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Channel assumed when the caller omits `channel`
    #[serde(default = "default_channel")]
    pub default_channel: String,
    /// User assumed when the caller omits `userId`
    #[serde(default = "default_user_id")]
    pub default_user_id: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::default(),
            api_key: None,
            base_url: None,
            default_model: default_model(),
            default_channel: default_channel(),
            default_user_id: default_user_id(),
        }
    }
}

/// Supported completion protocols
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    /// Message-array chat completions API
    #[default]
    Completions,
    /// Transcript-based responses API with typed stream events
    Responses,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_channel() -> String {
    "default".to_string()
}

fn default_user_id() -> String {
    "anonymous".to_string()
}

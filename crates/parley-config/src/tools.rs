use serde::Deserialize;
use url::Url;

/// Names of the tools shipped with Parley
pub const BUILTIN_TOOLS: &[&str] = &["order_sandwich", "send_photo"];

/// Built-in tool configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Tools exposed to the model
    #[serde(default = "default_enabled")]
    pub enabled: Vec<String>,
    /// `send_photo` delivery settings
    #[serde(default)]
    pub send_photo: SendPhotoConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            send_photo: SendPhotoConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendPhotoConfig {
    /// Endpoint notified with each photo; when absent photos are only logged
    #[serde(default)]
    pub webhook_url: Option<Url>,
}

fn default_enabled() -> Vec<String> {
    BUILTIN_TOOLS.iter().map(|&name| name.to_owned()).collect()
}

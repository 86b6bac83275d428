//! Built-in tools the model can call during a completion

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod order_sandwich;
mod send_photo;

use std::sync::Arc;

use parley_config::ToolsConfig;
use parley_llm::{Tool, ToolRegistry};

pub use order_sandwich::OrderSandwich;
pub use send_photo::SendPhoto;

/// Registry holding every enabled built-in tool
///
/// Names are validated when the configuration loads, so an unknown name
/// here is skipped with a warning rather than treated as fatal.
pub fn builtin_registry(config: &ToolsConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    for name in &config.enabled {
        let tool: Arc<dyn Tool> = match name.as_str() {
            OrderSandwich::NAME => Arc::new(OrderSandwich),
            SendPhoto::NAME => Arc::new(SendPhoto::new(config.send_photo.webhook_url.clone())),
            other => {
                tracing::warn!(tool = other, "ignoring unknown tool");
                continue;
            }
        };
        registry.register(tool);
    }

    tracing::info!(tools = registry.len(), "tool registry ready");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_enables_every_builtin() {
        let registry = builtin_registry(&ToolsConfig::default());
        let names: Vec<_> = registry.schemas().into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["order_sandwich", "send_photo"]);
    }

    #[test]
    fn only_enabled_tools_are_registered() {
        let config = ToolsConfig {
            enabled: vec!["send_photo".to_owned()],
            ..ToolsConfig::default()
        };
        let registry = builtin_registry(&config);
        assert!(registry.lookup("order_sandwich").is_none());
        assert!(registry.lookup("send_photo").is_some());
    }
}

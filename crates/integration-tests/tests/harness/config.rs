//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use indexmap::IndexMap;
use parley_config::{AuthConfig, BackendType, Config, ContextConfig, ServerConfig};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Point the chat completions adapter at a mock backend
    pub fn with_completions_backend(self, base_url: &str) -> Self {
        self.with_backend(BackendType::Completions, base_url)
    }

    /// Point the responses adapter at a mock backend
    pub fn with_responses_backend(self, base_url: &str) -> Self {
        self.with_backend(BackendType::Responses, base_url)
    }

    fn with_backend(mut self, backend: BackendType, base_url: &str) -> Self {
        self.config.llm.backend = backend;
        self.config.llm.base_url = Some(base_url.parse().expect("valid URL"));
        self.config.llm.api_key = Some(SecretString::from("test-key".to_owned()));
        self
    }

    /// Require a bearer token on every non-public path
    pub fn with_auth(mut self, token: &str) -> Self {
        self.config.server.auth = Some(AuthConfig {
            token: SecretString::from(token.to_owned()),
            public_paths: vec!["/health".to_owned()],
        });
        self
    }

    /// Replace the retrieved-context preamble and entries
    pub fn with_context(mut self, preamble: &str, entries: &[(&str, &str)]) -> Self {
        self.config.context = ContextConfig {
            preamble: preamble.to_owned(),
            entries: entries
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect::<IndexMap<_, _>>(),
        };
        self
    }

    /// Deliver `send_photo` calls to a webhook
    pub fn with_photo_webhook(mut self, url: &str) -> Self {
        self.config.tools.send_photo.webhook_url = Some(url.parse().expect("valid URL"));
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}

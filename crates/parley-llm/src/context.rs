//! Retrieved-context store and prompt assembly

use indexmap::IndexMap;
use parley_config::ContextConfig;

use crate::error::LlmError;
use crate::types::Message;

/// Source of the retrieved-context preamble
pub trait ContextStore: Send + Sync {
    /// Context text to place in the system message
    fn formatted_context(&self) -> Result<String, LlmError>;
}

/// Context store backed by fixed text loaded at startup
#[derive(Debug, Clone, Default)]
pub struct StaticContextStore {
    preamble: String,
    entries: IndexMap<String, String>,
}

impl StaticContextStore {
    pub fn new(preamble: impl Into<String>, entries: IndexMap<String, String>) -> Self {
        Self {
            preamble: preamble.into(),
            entries,
        }
    }

    pub fn from_config(config: &ContextConfig) -> Self {
        Self::new(config.preamble.clone(), config.entries.clone())
    }
}

impl ContextStore for StaticContextStore {
    fn formatted_context(&self) -> Result<String, LlmError> {
        if self.entries.is_empty() {
            return Ok(self.preamble.clone());
        }

        let entries = self
            .entries
            .iter()
            .map(|(key, text)| format!("{key}: {text}"))
            .collect::<Vec<_>>()
            .join("\n");

        if self.preamble.is_empty() {
            Ok(entries)
        } else {
            Ok(format!("{}\n\n{entries}", self.preamble))
        }
    }
}

/// Prepend exactly one system message carrying the retrieved context
///
/// The caller's messages follow in their original order.
pub fn assemble(store: &dyn ContextStore, messages: Vec<Message>) -> Result<Vec<Message>, LlmError> {
    let context = store.formatted_context()?;

    let mut assembled = Vec::with_capacity(messages.len() + 1);
    assembled.push(Message::system(context));
    assembled.extend(messages);
    Ok(assembled)
}

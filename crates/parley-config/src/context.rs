use indexmap::IndexMap;
use serde::Deserialize;

/// Static retrieved-context store
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Instruction text placed ahead of the context entries
    #[serde(default = "default_preamble")]
    pub preamble: String,
    /// Context entries keyed by topic, rendered in file order
    #[serde(default)]
    pub entries: IndexMap<String, String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            preamble: default_preamble(),
            entries: IndexMap::new(),
        }
    }
}

fn default_preamble() -> String {
    "You are a helpful voice assistant. Keep answers short and conversational. \
     Use the following context when it is relevant to the user's question."
        .to_string()
}

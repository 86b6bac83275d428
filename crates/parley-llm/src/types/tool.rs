use serde::{Deserialize, Serialize};

/// Schema of a function the model may call
///
/// One entry per registered tool. Each backend adapter translates it into
/// the shape its protocol expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Function name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema for the function parameters
    pub parameters: serde_json::Value,
}

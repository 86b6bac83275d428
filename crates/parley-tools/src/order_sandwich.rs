use async_trait::async_trait;
use parley_llm::{Tool, ToolDefinition, ToolError};
use serde::Deserialize;
use serde_json::{Value, json};

/// Places a sandwich order for the caller
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderSandwich;

impl OrderSandwich {
    pub const NAME: &'static str = "order_sandwich";
}

#[derive(Debug, Deserialize)]
struct Arguments {
    filling: String,
}

#[async_trait]
impl Tool for OrderSandwich {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_owned(),
            description: "Order a sandwich with the given filling".to_owned(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "filling": {
                        "type": "string",
                        "description": "Filling for the sandwich"
                    }
                },
                "required": ["filling"]
            }),
        }
    }

    async fn call(&self, app_id: &str, user_id: &str, channel: &str, arguments: Value) -> Result<String, ToolError> {
        let Arguments { filling } =
            serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        tracing::info!(app_id, user_id, channel, filling = %filling, "sandwich ordered");
        Ok(format!("Sandwich ordered with {filling}. Enjoy!"))
    }
}

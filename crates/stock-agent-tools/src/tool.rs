//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;
use stock_agent_core::Result;

/// Trait for tools that agents can execute
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with parameters matching `input_schema`
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Unique name within a `ToolRegistry`
    fn name(&self) -> &str;

    /// Tells the model when to use this tool
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's parameters
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "symbol": { "type": "string" },
    ///         "period": { "type": "string", "enum": ["1mo", "3mo", "1y"] }
    ///     },
    ///     "required": ["symbol"]
    /// });
    /// assert_eq!(schema["required"][0], "symbol");
    /// ```
    fn input_schema(&self) -> Value;
}
